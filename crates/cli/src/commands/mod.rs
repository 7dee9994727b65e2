//! Built-in subcommands.

mod list;
mod run;
mod shell;

pub use list::list;
pub use run::run;
pub use shell::shell;
