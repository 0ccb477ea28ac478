//! Sessions for the kres resolution core.
//!
//! A session is the bound semantic context of one source module, of a bucket
//! of binary dependencies, or of the shared builtins. It is assembled by a
//! staged [`SessionBuilder`] and published as an immutable `Arc<Session>`:
//!
//! 1. `bind` - attach modules; every dependency must already be published
//! 2. `register_components` - language settings and baseline checkers
//! 3. `register_dependency_providers` - the structured providers of the
//!    dependencies, ordered actual before expect
//! 4. `configure_extensions` - extension checkers and generated declarations
//! 5. `finalize_providers` - the main composite and the dependencies-only one
//! 6. `publish`
//!
//! [`SessionFactory`] runs these steps for the three session layers, shared
//! library first.

pub mod builder;
pub mod checkers;
pub mod components;
pub mod error;
pub mod extensions;
pub mod factory;
pub mod module_data;
pub mod session;
pub mod session_provider;

pub use builder::{BuildStep, SessionBuilder};
pub use checkers::{
    CheckerRegistry, ConflictingOverloadsChecker, DeclarationChecker, Diagnostic, DiagnosticKind,
};
pub use components::ComponentRegistry;
pub use error::{Result, SessionError};
pub use extensions::{ExtensionConfiguration, ExtensionContext, ExtensionRegistrar, GeneratedDeclarations};
pub use factory::SessionFactory;
pub use module_data::{ModuleData, ModuleDataBuilder};
pub use session::{Session, SyntheticFunctionInterfacesProvider};
pub use session_provider::SessionProvider;
