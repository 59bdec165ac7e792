//! Typed client SDK generation from GraphQL schemas.
//!
//! The pipeline is parse → order → render:
//!
//! 1. [`parse_schema`] turns SDL text into a [`DomainModelCollection`].
//! 2. [`DomainModelCollection::topological_order`] orders the models so that
//!    every model comes after the models its fields reference.
//! 3. [`render`] feeds the ordered models through the embedded templates and
//!    produces a client module and a schema module.
//!
//! # Example
//!
//! ```ignore
//! use sdkgen_gql::{generate, RenderOptions};
//!
//! let sdl = std::fs::read_to_string("schema.graphql")?;
//! let options = RenderOptions::builder().client_name("Cine").build();
//! let sdk = generate(&sdl, &options)?;
//! sdk.write_to("src/generated")?;
//! ```

pub mod codegen;
mod error;
pub mod model;
pub mod naming;
mod order;
mod parser;

pub use codegen::{render, GeneratedSdk, RenderOptions};
pub use error::{GenError, GenResult};
pub use model::{
    Argument, DomainModel, DomainModelCollection, EnumModel, Field, OperationKind, QueryOperation,
};
pub use parser::parse_schema;

/// Run the whole pipeline over SDL text.
pub fn generate(sdl: &str, options: &RenderOptions) -> GenResult<GeneratedSdk> {
    let collection = parse_schema(sdl)?;
    render(&collection, options)
}
