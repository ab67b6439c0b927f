use anyhow::Context as _;
use clap::{Arg, ArgAction, ArgMatches, Command};
use datawing_node::prelude::*;
use datawing_node::{FieldKind, ValueKind};
use tracing_subscriber::prelude::*;

fn cli() -> Command {
    Command::new("datawing")
        .version(datawing_node::VERSION)
        .about("Datawing upload node driver")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to a TOML configuration file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Override the service base URL"),
        )
        .subcommand(
            Command::new("schema")
                .about("Fetch options and print the node input schema")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the host dictionary form as JSON"),
                ),
        )
        .subcommand(Command::new("games").about("List game choices"))
        .subcommand(Command::new("users").about("List user choices"))
        .subcommand(
            Command::new("upload")
                .about("Upload an image file through the node entry point")
                .arg(
                    Arg::new("image")
                        .long("image")
                        .required(true)
                        .help("Image file to upload (any format the decoder reads)"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("")
                        .help("Upload name; blank uses the configured default"),
                )
                .arg(
                    Arg::new("game")
                        .long("game")
                        .required(true)
                        .help("Game label as listed by `games`, e.g. 'Alpha[7]'"),
                )
                .arg(
                    Arg::new("user")
                        .long("user")
                        .required(true)
                        .help("User nickname"),
                )
                .arg(
                    Arg::new("tags")
                        .long("tags")
                        .default_value("")
                        .help("Comma-separated tags"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<DatawingConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => DatawingConfig::from_file(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => DatawingConfig::new(),
    };
    if let Some(url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(url);
        config.validate()?;
    }
    Ok(config)
}

fn print_choices(kind: &str, outcome: &OptionsOutcome<OptionChoice>) {
    match outcome.remote_status() {
        Some(status) => eprintln!("{kind} unavailable: service status {status}"),
        None => {
            for label in outcome.labels() {
                println!("{label}");
            }
        }
    }
}

fn print_schema(schema: &NodeSchema) {
    let groups = [("required", &schema.required), ("optional", &schema.optional)];
    for (group, fields) in groups {
        println!("{group}:");
        for field in fields.iter() {
            match &field.kind {
                FieldKind::Image => println!("  {}: {}", field.name, ValueKind::Image.as_str()),
                FieldKind::Text { multiline, default } => println!(
                    "  {}: STRING (multiline: {multiline}, default: {default:?})",
                    field.name
                ),
                FieldKind::Choice(choices) => {
                    println!("  {}: one of {} choice(s)", field.name, choices.len());
                    for choice in choices {
                        println!("    - {choice}");
                    }
                }
            }
        }
    }
}

async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let config = load_config(&matches)?;
    let node = DatawingNode::new(config)?;

    match matches.subcommand() {
        Some(("schema", args)) => {
            let schema = node.input_types().await?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&schema.to_host_json())?);
            } else {
                print_schema(&schema);
            }
        }
        Some(("games", _)) => print_choices("games", &node.client().load_games().await?),
        Some(("users", _)) => print_choices("users", &node.client().load_users().await?),
        Some(("upload", args)) => {
            let path = args
                .get_one::<String>("image")
                .context("--image is required")?;
            let decoded = image::open(path)
                .with_context(|| format!("reading image {path}"))?
                .to_rgb8();
            let image = ImageBatch::from_rgb8(&decoded)?;

            let arg = |name: &str| args.get_one::<String>(name).cloned().unwrap_or_default();
            let inputs = UploadInputs::from_labels(
                image,
                arg("name"),
                arg("game"),
                arg("user"),
                arg("tags"),
            );
            // The service answer is reported by the node's `datawing` log line.
            let (image,) = node.execute(inputs).await?;
            let (_, height, width, _) = image.shape();
            println!("uploaded {width}x{height} image");
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datawing=info,datawing_node=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    if let Err(e) = run(matches).await {
        tracing::error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn upload_requires_game_and_user() {
        let result = cli().try_get_matches_from(["datawing", "upload", "--image", "a.png"]);
        assert!(result.is_err());
    }

    #[test]
    fn base_url_override_is_validated() {
        let matches = cli()
            .try_get_matches_from(["datawing", "--base-url", "ftp://x", "games"])
            .unwrap();
        assert!(load_config(&matches).is_err());

        let matches = cli()
            .try_get_matches_from(["datawing", "games", "--base-url", "http://127.0.0.1:1/"])
            .unwrap();
        assert_eq!(load_config(&matches).unwrap().base_url, "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn upload_goes_through_node_entry_point() {
        let mock = datawing_test_utils::MockDatawing::builder().spawn().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("white.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let matches = cli()
            .try_get_matches_from([
                "datawing",
                "--base-url",
                mock.base_url(),
                "upload",
                "--image",
                path.to_str().unwrap(),
                "--game",
                "Alpha[7]",
                "--user",
                "bob",
            ])
            .unwrap();
        run(matches).await.unwrap();

        let uploads = mock.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].field("gameId"), Some("7"));
        assert_eq!(uploads[0].field("name"), Some("datawing"));
    }
}
