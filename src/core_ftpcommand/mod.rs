// Here's the list of the FTP commands implemented
pub mod appe;
pub mod auth;
pub mod cdup;
pub mod cwd;
pub mod dele;
pub mod feat;
pub mod list;
pub mod mkd;
pub mod noop;
pub mod pass;
pub mod pwd;
pub mod quit;
pub mod retr;
pub mod rmd;
pub mod rnfr;
pub mod rnto;
pub mod site;
pub mod stor;
pub mod stou;
pub mod syst;
pub mod type_;
pub mod user;

// Request/reply model, routing and interception glue
pub mod context;
pub mod dispatch;
pub mod error;
pub mod ftpcommand;
pub mod handlers;
pub mod intercept;
pub mod reply;
pub mod request;

// The utils and common functions are here
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;
