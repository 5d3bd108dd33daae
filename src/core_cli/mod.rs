use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ftpletd", about = "An extensible FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen port, overrides `listen_port` from the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the bcrypt hash of a password for the passwd file, then exit
    #[arg(long, value_name = "PLAIN")]
    pub hash_password: Option<String>,
}
