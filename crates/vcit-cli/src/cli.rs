use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vcit_types::ObjectKind;

#[derive(Parser)]
#[command(
    name = "vcit",
    about = "vcit: a content-addressed object store with git-style objects",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init(InitArgs),
    /// Compute an object id from a file, optionally storing the object
    HashObject(HashObjectArgs),
    /// Print the payload of a stored object
    CatFile(CatFileArgs),
    /// Resolve a name to an object id
    RevParse(RevParseArgs),
    /// List refs and the objects they point to
    ShowRef(ShowRefArgs),

    /// Stage files (not implemented)
    Add(PassthroughArgs),
    /// Check out a commit (not implemented)
    Checkout(PassthroughArgs),
    /// Record a commit (not implemented)
    Commit(PassthroughArgs),
    /// Show commit history (not implemented)
    Log(PassthroughArgs),
    /// List staged files (not implemented)
    LsFiles(PassthroughArgs),
    /// List a tree (not implemented)
    LsTree(PassthroughArgs),
    /// Merge histories (not implemented)
    Merge(PassthroughArgs),
    /// Replay commits onto another base (not implemented)
    Rebase(PassthroughArgs),
    /// Remove files (not implemented)
    Rm(PassthroughArgs),
    /// Create or list tags (not implemented)
    Tag(PassthroughArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Where to create the repository
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Object kind to hash the content as
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub kind: ObjectKind,
    /// Store the object in the repository
    #[arg(short, long)]
    pub write: bool,
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Kind to peel the object to
    pub kind: ObjectKind,
    /// Object name: id, abbreviation, ref or HEAD
    pub object: String,
}

#[derive(Args)]
pub struct RevParseArgs {
    /// Peel the result to this kind
    #[arg(long = "type")]
    pub kind: Option<ObjectKind>,
    pub name: String,
}

#[derive(Args)]
pub struct ShowRefArgs {}

/// Accepts anything so unimplemented commands fail with a clear error
/// rather than a usage message.
#[derive(Args)]
pub struct PassthroughArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
