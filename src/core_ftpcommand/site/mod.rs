mod handler;

pub mod site_extensions;
pub mod site_help;
pub mod site_stat;

pub use handler::handle_site_command;
