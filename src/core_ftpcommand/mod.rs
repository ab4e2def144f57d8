// Verb table and dispatcher
pub mod ftpcommand;
pub mod handlers;

// One module per command family
pub mod cwd;
pub mod dele;
pub mod help;
pub mod list;
pub mod mkd;
pub mod pass;
pub mod pwd;
pub mod rein;
pub mod rest;
pub mod retr;
pub mod rmd;
pub mod rnfr;
pub mod rnto;
pub mod simple;
pub mod stor;
pub mod syst;
pub mod type_;
pub mod user;
