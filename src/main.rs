use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use folio::build::{build_feed, build_site, Summary};
use folio::config::Config;
use folio::toc;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let matches = app().get_matches();

    match matches.subcommand() {
        ("build", _) => report(build_site(&load_config(&matches)?)?),
        ("feed", _) => report(build_feed(&load_config(&matches)?)?),
        ("toc", Some(args)) => print_toc(&toc_source(&matches, args)?),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn app() -> App<'static, 'static> {
    App::new("folio")
        .about("Renders a markdown article page and the blog's RSS feed")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .short("p")
                .takes_value(true)
                .value_name("DIR")
                .help("Where to start looking for folio.yaml (default: the working directory)"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .value_name("DIR")
                .help("Overrides the output directory"),
        )
        .subcommand(SubCommand::with_name("build").about("Writes index.html and the feed"))
        .subcommand(SubCommand::with_name("feed").about("Writes only the feed"))
        .subcommand(
            SubCommand::with_name("toc")
                .about("Prints the table of contents for a markdown file")
                .arg(
                    Arg::with_name("FILE")
                        .help("The markdown file (default: the configured page content)")
                        .index(1),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let dir = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("Getting the working directory")?,
    };
    Ok(Config::from_directory(
        &dir,
        matches.value_of("output").map(Path::new),
    )?)
}

fn report(summary: Summary) -> Result<()> {
    if let Some(page) = &summary.page {
        println!("page: {}", page.display());
    }
    println!(
        "feed: {} ({} posts, {} warnings)",
        summary.feed.display(),
        summary.posts,
        summary.warnings
    );
    Ok(())
}

// An explicit file doesn't need a project.
fn toc_source(matches: &ArgMatches, args: &ArgMatches) -> Result<PathBuf> {
    match args.value_of("FILE") {
        Some(file) => Ok(PathBuf::from(file)),
        None => {
            let config = load_config(matches)?;
            Ok(config.content_path(&config.page.content))
        }
    }
}

fn print_toc(path: &Path) -> Result<()> {
    let markdown = std::fs::read_to_string(path)
        .with_context(|| format!("Reading `{}`", path.display()))?;
    for heading in toc::extract_headings(&markdown) {
        let indent = "  ".repeat(usize::from(heading.level.depth() - 2));
        println!("{}{} #{}", indent, heading.text, heading.id);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn toc_source_for(args: &[&str]) -> Result<PathBuf> {
        let matches = app().get_matches_from(args.to_vec());
        match matches.subcommand() {
            ("toc", Some(toc_args)) => toc_source(&matches, toc_args),
            other => panic!("wanted the toc subcommand, got {:?}", other.0),
        }
    }

    #[test]
    fn test_toc_file_needs_no_project() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let project = dir.path().to_string_lossy().into_owned();
        let path = toc_source_for(&["folio", "--project", &project, "toc", "notes.md"])?;
        assert_eq!(PathBuf::from("notes.md"), path);
        Ok(())
    }

    #[test]
    fn test_toc_defaults_to_page_content() -> Result<()> {
        let path = toc_source_for(&["folio", "--project", "./testdata/project", "toc"])?;
        assert_eq!(Path::new("./testdata/project/public/content/post.md"), path);
        Ok(())
    }
}
