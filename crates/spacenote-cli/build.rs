use clap::{Command, CommandFactory};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

mod cli {
    include!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/cli.rs"));
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::other("OUT_DIR is not set"))?
        .join("man");
    fs::create_dir_all(&out_dir)?;

    let cmd = cli::Cli::command();
    write_pages(&cmd, "spacenote", &out_dir)
}

/// One page per command, nested commands included: `spacenote-space-list.1`.
fn write_pages(cmd: &Command, page_name: &str, out_dir: &Path) -> io::Result<()> {
    let mut buffer = Vec::new();
    Man::new(cmd.clone())
        .title(page_name.to_uppercase())
        .render(&mut buffer)?;
    fs::write(out_dir.join(format!("{page_name}.1")), buffer)?;

    for subcommand in cmd.get_subcommands() {
        let name = format!("{page_name}-{}", subcommand.get_name());
        write_pages(subcommand, &name, out_dir)?;
    }
    Ok(())
}
