use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate every pending piece from the source directory to the remote
    /// storage service. Configured entirely via PIECEHAUL_* environment
    /// variables; safe to re-run until everything is handled.
    Migrate {
        #[arg(long, help = "Print the final summary as JSON instead of a table")]
        json: bool,
    },

    /// Inspect the persisted progress record without modifying it.
    Progress {
        #[arg(long, help = "Print the progress record as JSON instead of a table")]
        json: bool,
    },
}
