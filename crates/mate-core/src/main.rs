use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mate_core::pipeline::{CRATE_FILE, PAGE_FILE};
use mate_core::report::submission_comment;
use mate_core::{timestamp, Crosswalk, GitHubSink, HttpMedia, Offline, Pipeline, PipelineConfig};
use mate_graph::{HttpTemplates, TemplateSource};
use mate_intake::{Collaborators, HttpRegistry, RecordKind};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let issue = Arg::new("issue")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Issue body file, `-` for stdin");
    let offline = Arg::new("offline")
        .long("offline")
        .action(ArgAction::SetTrue)
        .help("Skip every registry and template lookup");

    Command::new("mate")
        .version(mate_core::VERSION)
        .about("Model Atlas of the Earth submission pipeline")
        .subcommand_required(true)
        .arg(
            Arg::new("crosswalk")
                .long("crosswalk")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Crosswalk file replacing the built-in one"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .env("GITHUB_TOKEN")
                .hide_env_values(true)
                .global(true)
                .help("GitHub API token"),
        )
        .arg(
            Arg::new("issue-number")
                .long("issue-number")
                .env("ISSUE_NUMBER")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Submission issue receiving comments"),
        )
        .arg(
            Arg::new("owner")
                .long("owner")
                .env("OWNER")
                .global(true)
                .help("Owner of the model repository"),
        )
        .arg(
            Arg::new("repo")
                .long("repo")
                .env("REPO")
                .global(true)
                .help("Model repository name"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .env("DEFAULT_TIMEOUT")
                .global(true)
                .default_value("10")
                .value_parser(value_parser!(u64))
                .help("Request timeout in seconds"),
        )
        .args(base_url_args())
        .subcommand(
            Command::new("report")
                .about("Parse the issue and post the submission report")
                .arg(issue.clone())
                .arg(offline.clone())
                .arg(
                    Arg::new("print")
                        .long("print")
                        .action(ArgAction::SetTrue)
                        .help("Print the report instead of posting it"),
                ),
        )
        .subcommand(
            Command::new("slug")
                .about("Print the repository slug chosen for the issue")
                .arg(issue.clone())
                .arg(offline.clone()),
        )
        .subcommand(
            Command::new("render")
                .about("Build the crate and website page locally")
                .arg(issue.clone())
                .arg(offline)
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory receiving the artifacts; stdout gets them otherwise"),
                ),
        )
        .subcommand(
            Command::new("publish")
                .about("Publish the submission into its model repository")
                .arg(issue),
        )
}

fn base_url_args() -> Vec<Arg> {
    [
        ("publication-base", "BASE_URL_PUBLICATION", "Crossref works endpoint"),
        ("software-base", "BASE_URL_SOFTWARE", "DOI resolver for software"),
        ("organization-base", "BASE_URL_ORGANIZATION", "ROR organizations endpoint"),
        ("author-base", "BASE_URL_AUTHOR", "ORCID public API endpoint"),
    ]
    .into_iter()
    .map(|(name, env, help)| Arg::new(name).long(name).env(env).global(true).help(help))
    .collect()
}

fn pipeline_config(matches: &ArgMatches) -> PipelineConfig {
    let timeout = matches.get_one::<u64>("timeout").copied().unwrap_or(10);
    let mut config = PipelineConfig::new()
        .with_timeout_secs(timeout)
        .with_token(matches.get_one::<String>("token").cloned());
    if let Some(owner) = matches.get_one::<String>("owner") {
        config = config.with_owner(owner.clone());
    }
    for (name, kind) in [
        ("publication-base", RecordKind::Publication),
        ("software-base", RecordKind::Software),
        ("organization-base", RecordKind::Organization),
        ("author-base", RecordKind::Author),
    ] {
        if let Some(url) = matches.get_one::<String>(name) {
            config.registry = config.registry.with_base_url(kind, url.clone());
        }
    }
    config.github.issue_number = matches.get_one::<u64>("issue-number").copied();
    config.github.repo = matches.get_one::<String>("repo").cloned();
    config
}

fn read_issue(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body).context("reading issue body from stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading issue body from {}", path.display()))
}

fn write_artifact(dir: &Path, name: &str, content: &str) -> Result<()> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "artifact written");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let crosswalk = match matches.get_one::<PathBuf>("crosswalk") {
        Some(path) => Crosswalk::load(path)?,
        None => Crosswalk::embedded()?,
    };
    let config = pipeline_config(&matches);
    let (command, args) = matches.subcommand().context("a subcommand is required")?;
    let body = read_issue(args.get_one::<PathBuf>("issue").context("issue path is required")?)?;

    let offline = Offline;
    let registry;
    let templates;
    let (collaborators, template_source): (Collaborators<'_>, &dyn TemplateSource) =
        if args.try_get_one::<bool>("offline").ok().flatten().copied().unwrap_or(false) {
            (Collaborators::from_one(&offline), &offline)
        } else {
            registry = HttpRegistry::new(config.registry.clone()).context("building registry client")?;
            templates = HttpTemplates::new(config.templates.clone()).context("building template client")?;
            (Collaborators::from_one(&registry), &templates)
        };
    let pipeline = Pipeline::new(&crosswalk, collaborators, template_source)?;
    let now = timestamp(Utc::now());

    match command {
        "report" => {
            if args.get_flag("print") {
                let assembled = pipeline.parse(&body).await;
                println!("{}", submission_comment(&assembled.record, &assembled.log, &crosswalk.constants));
            } else {
                let sink = GitHubSink::new(config.github.clone(), config.registry.timeout_secs)?;
                pipeline.report(&body, &sink).await?;
            }
        }
        "slug" => {
            let assembled = pipeline.parse(&body).await;
            match assembled.record.get_str("slug") {
                Some(slug) if !slug.is_empty() => println!("{slug}"),
                _ => bail!("no repository slug could be chosen"),
            }
        }
        "render" => {
            let outputs = pipeline.outputs(&body, &now).await;
            let page = outputs.page?;
            match args.get_one::<PathBuf>("out") {
                Some(dir) => {
                    match &outputs.graph {
                        Ok(graph) => write_artifact(dir, CRATE_FILE, &graph.to_json_pretty()?)?,
                        Err(err) => tracing::warn!(error = %err, "crate skipped"),
                    }
                    write_artifact(dir, PAGE_FILE, &page.page)?;
                    let comment = submission_comment(
                        &outputs.assembled.record,
                        &outputs.assembled.log,
                        &crosswalk.constants,
                    );
                    write_artifact(dir, "report.md", &comment)?;
                }
                None => {
                    println!("{}", serde_json::to_string_pretty(outputs.assembled.record.as_value())?);
                    if let Ok(graph) = &outputs.graph {
                        println!("{}", graph.to_json_pretty()?);
                    }
                    print!("{}", page.page);
                }
            }
        }
        "publish" => {
            let Some(repo) = config.github.repo.clone() else {
                bail!("publishing needs --repo or REPO");
            };
            let sink = GitHubSink::new(config.github.clone(), config.registry.timeout_secs)?;
            let media = HttpMedia::new(config.registry.timeout_secs)?;
            let summary = pipeline
                .publish(&body, &now, &sink, &media, (config.github.owner.as_str(), repo.as_str()))
                .await?;
            info!(files = summary.files.len(), topics = ?summary.topics, "done");
        }
        other => bail!("unknown command {other}"),
    }
    Ok(())
}
