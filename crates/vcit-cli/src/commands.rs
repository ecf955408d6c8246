use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use vcit_repo::{names, refs, Repository};
use vcit_store::{codec, Object, ObjectStore};
use vcit_types::{ObjectId, ObjectKind};

use crate::cli::*;

/// Errors raised by the command layer itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
}

#[derive(Serialize)]
struct ObjectOutput<'a> {
    id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ObjectKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(args, &cwd, format),
        Command::HashObject(args) => cmd_hash_object(args, &cwd, format).map(|_| ()),
        Command::CatFile(args) => cmd_cat_file(args, &cwd, format),
        Command::RevParse(args) => cmd_rev_parse(args, &cwd, format).map(|_| ()),
        Command::ShowRef(_) => cmd_show_ref(&cwd, format),
        Command::Add(_) => unimplemented_command("add"),
        Command::Checkout(_) => unimplemented_command("checkout"),
        Command::Commit(_) => unimplemented_command("commit"),
        Command::Log(_) => unimplemented_command("log"),
        Command::LsFiles(_) => unimplemented_command("ls-files"),
        Command::LsTree(_) => unimplemented_command("ls-tree"),
        Command::Merge(_) => unimplemented_command("merge"),
        Command::Rebase(_) => unimplemented_command("rebase"),
        Command::Rm(_) => unimplemented_command("rm"),
        Command::Tag(_) => unimplemented_command("tag"),
    }
}

fn unimplemented_command(name: &'static str) -> anyhow::Result<()> {
    Err(CliError::Unimplemented(name).into())
}

fn open_repository(cwd: &Path) -> anyhow::Result<Repository> {
    vcit_repo::locate(cwd, true)?
        .with_context(|| format!("no repository found from {}", cwd.display()))
}

fn cmd_init(args: InitArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let path = cwd.join(args.path.unwrap_or_else(|| ".".into()));
    let repo = vcit_repo::init(&path)
        .with_context(|| format!("failed to initialize repository at {}", path.display()))?;

    match format {
        OutputFormat::Text => println!(
            "{} Initialized empty vcit repository in {}",
            "✓".green().bold(),
            repo.control_dir().display().to_string().bold()
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "control_dir": repo.control_dir().display().to_string() })
        ),
    }
    Ok(())
}

fn cmd_hash_object(
    args: HashObjectArgs,
    cwd: &Path,
    format: OutputFormat,
) -> anyhow::Result<ObjectId> {
    let path = cwd.join(&args.path);
    let data = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let object = Object::deserialize(args.kind, &data)
        .with_context(|| format!("{} is not a valid {}", path.display(), args.kind))?;

    let id = if args.write {
        let repo = open_repository(cwd)?;
        vcit_repo::write_object(&repo, &object, true)?
    } else {
        codec::hash_object(&object)?
    };

    match format {
        OutputFormat::Text => println!("{id}"),
        OutputFormat::Json => print_json(&ObjectOutput {
            id,
            kind: Some(args.kind),
            name: None,
            content: None,
        })?,
    }
    Ok(id)
}

fn cmd_cat_file(args: CatFileArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open_repository(cwd)?;
    let id = names::find_object(&repo, &args.object, Some(args.kind))?;
    let payload = vcit_repo::read_object(&repo, &id)?.serialize()?;

    match format {
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&payload)?;
            stdout.flush()?;
        }
        OutputFormat::Json => print_json(&ObjectOutput {
            id,
            kind: Some(args.kind),
            name: Some(args.object.as_str()),
            content: Some(String::from_utf8_lossy(&payload).into_owned()),
        })?,
    }
    Ok(())
}

fn cmd_rev_parse(args: RevParseArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<ObjectId> {
    let repo = open_repository(cwd)?;
    let id = names::find_object(&repo, &args.name, args.kind)?;

    match format {
        OutputFormat::Text => println!("{id}"),
        OutputFormat::Json => {
            // A full hex id resolves even when nothing is stored under it.
            let kind = repo.objects().kind_of(&id)?;
            print_json(&ObjectOutput {
                id,
                kind,
                name: Some(args.name.as_str()),
                content: None,
            })?
        }
    }
    Ok(id)
}

fn cmd_show_ref(cwd: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let repo = open_repository(cwd)?;
    let entries = refs::list_refs(&repo)?;

    match format {
        OutputFormat::Text => {
            for entry in &entries {
                println!("{} {}", entry.id.to_string().yellow(), entry.name);
            }
        }
        OutputFormat::Json => print_json(&entries)?,
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
