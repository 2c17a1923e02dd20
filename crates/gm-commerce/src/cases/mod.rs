//! Phone-case taxonomy and model compatibility.

mod compat;
mod registry;
mod taxonomy;

pub use compat::{find_allowed, AllowedModel, ModelMapping};
pub use taxonomy::{
    CaseMainCategory, CaseModel, CasePhone, CaseProduct, CaseProductFields, CaseProductInput,
    CaseVariant,
};
