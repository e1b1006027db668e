//! Category taxonomy feature: a two-level tree of main categories and
//! subcategories over a flat table.
//!
//! The tree is never stored; every view is re-derived from the flat row set
//! by [`hierarchy::build_tree`]. Sibling order is edited locally through
//! [`ordering::SiblingOrder`] and committed as one batch, and deleting a
//! category with subcategories goes through the [`resolver`] so no child is
//! ever orphaned.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | List active categories (flat or tree) |
//! | GET | `/api/categories/{id}` | No | Get one active category |
//! | GET | `/api/admin/categories` | Admin | Full flat list |
//! | POST | `/api/admin/categories` | Admin | Create category |
//! | PUT | `/api/admin/categories/reorder` | Admin | Save batched sibling order |
//! | PUT | `/api/admin/categories/{id}` | Admin | Update / structural move |
//! | DELETE | `/api/admin/categories/{id}` | Admin | Delete with resolution option |

pub mod dtos;
pub mod handlers;
pub mod hierarchy;
pub mod models;
pub mod ordering;
pub mod resolver;
pub mod routes;
pub mod services;

pub use services::CategoryService;
