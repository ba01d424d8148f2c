use clap::Parser;
use marker_pose_viewer::config::ViewerConfig;
use marker_pose_viewer::scene::SceneSink;
use marker_pose_viewer::viewer;

#[derive(Parser)]
#[command(version, about, author)]
struct MpviewCli {
    /// viewer config json, missing fields fall back to defaults
    #[arg(short, long)]
    config: Option<String>,

    /// broker host, overrides the config
    #[arg(long)]
    host: Option<String>,

    /// broker port, overrides the config
    #[arg(long)]
    port: Option<u16>,

    /// topic to subscribe to, overrides the config
    #[arg(short, long)]
    topic: Option<String>,

    /// connect to a running rerun viewer instead of spawning one
    #[arg(long, conflicts_with = "save")]
    connect: Option<String>,

    /// write the recording to an .rrd file instead of spawning a viewer
    #[arg(long)]
    save: Option<String>,

    /// write the effective config to this path and exit
    #[arg(long)]
    write_config: Option<String>,
}

impl MpviewCli {
    fn sink(&self) -> SceneSink {
        if let Some(url) = &self.connect {
            SceneSink::Connect(url.clone())
        } else if let Some(path) = &self.save {
            SceneSink::Save(path.clone())
        } else {
            SceneSink::Spawn
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = MpviewCli::parse();

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(host) = &cli.host {
        config.broker.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.broker.port = port;
    }
    if let Some(topic) = &cli.topic {
        config.broker.topic = topic.clone();
    }

    if let Some(path) = &cli.write_config {
        config.to_file(path)?;
        log::info!("wrote config to {}", path);
        return Ok(());
    }

    if let Err(e) = viewer::run(&config, &cli.sink()) {
        log::error!("{}", e);
        return Err(e.into());
    }
    Ok(())
}
