use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lazybook", version, about = "TUI for browsing and managing bookable services")]
pub struct Args {
    /// Directory holding the service and account files
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Email to prefill on the sign-in form
    #[arg(short, long)]
    pub email: Option<String>,

    /// Populate the store with demo services and an admin account
    #[arg(long)]
    pub seed_demo: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "lazybook",
            "--data-dir",
            "/tmp/book",
            "-e",
            "lan@example.com",
            "--seed-demo",
        ]);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/book")));
        assert_eq!(args.email.as_deref(), Some("lan@example.com"));
        assert!(args.seed_demo);
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["lazybook"]);
        assert!(args.data_dir.is_none());
        assert!(!args.seed_demo);
    }
}
