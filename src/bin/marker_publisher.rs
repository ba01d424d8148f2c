use clap::Parser;
use marker_pose_viewer::broker::{drain_until_disconnect, mqtt_options, qos_from_level};
use marker_pose_viewer::config::BrokerConfig;
use marker_pose_viewer::marker::{MarkerFrame, MarkerRecord, encode_payload};
use nalgebra as na;
use rand::Rng;
use rumqttc::AsyncClient;
use std::time::Duration;

const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(author, version, about = "Publish synthetic marker poses", long_about = None)]
struct Args {
    /// Broker host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Broker port
    #[arg(long, default_value = "1883")]
    port: u16,

    /// Topic to publish on
    #[arg(short, long, default_value = "aruco")]
    topic: String,

    /// Number of markers per frame, the first one is the origin
    #[arg(short, long, default_value = "4")]
    num_markers: usize,

    /// Frames per second
    #[arg(long, default_value = "20")]
    rate: u32,

    /// Number of frames to publish, 0 for unlimited
    #[arg(long, default_value = "0")]
    num_frames: u64,
}

/// Markers on a ring in the XY plane around an origin marker, jittered.
fn synthetic_frame<R: Rng>(rng: &mut R, num_markers: usize, t: f64) -> MarkerFrame {
    (0..num_markers)
        .map(|i| {
            let (position, base_angle) = if i == 0 {
                ([0.0, 0.0, 0.0], 0.0)
            } else {
                let theta = std::f64::consts::TAU * i as f64 / (num_markers - 1) as f64;
                let z = 0.02 * (t + theta).sin();
                ([0.08 * theta.cos(), 0.08 * theta.sin(), z], theta)
            };
            let jitter: na::Vector3<f64> = na::Vector3::new(
                rng.random_range(-0.05..0.05),
                rng.random_range(-0.05..0.05),
                rng.random_range(-0.05..0.05),
            );
            let rot = na::Rotation3::from_axis_angle(&na::Vector3::z_axis(), base_angle + t)
                * na::Rotation3::from_scaled_axis(jitter);
            let rvec = rot.scaled_axis();
            (
                i.to_string(),
                MarkerRecord::new(position, [rvec.x, rvec.y, rvec.z]).with_origin(i == 0),
            )
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = BrokerConfig {
        host: args.host,
        port: args.port,
        topic: args.topic,
        client_id: format!("marker-publisher-{}", std::process::id()),
        ..Default::default()
    };
    let qos = qos_from_level(config.qos)?;
    let (client, eventloop) = AsyncClient::new(mqtt_options(&config), config.channel_capacity);
    let mut pump = tokio::spawn(drain_until_disconnect(eventloop));

    let period = Duration::from_secs_f64(1.0 / args.rate.max(1) as f64);
    let mut ticker = tokio::time::interval(period);
    let mut rng = rand::rng();
    let mut sent = 0u64;
    log::info!("publishing on '{}' every {:?}", config.topic, period);
    while args.num_frames == 0 || sent < args.num_frames {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
        if pump.is_finished() {
            match (&mut pump).await? {
                Err(e) => anyhow::bail!("connection lost after {} frames: {}", sent, e),
                Ok(()) => anyhow::bail!("broker connection closed after {} frames", sent),
            }
        }
        let frame = synthetic_frame(&mut rng, args.num_markers, sent as f64 * period.as_secs_f64());
        let payload = encode_payload(&frame, "markers")?;
        client.publish(config.topic.as_str(), qos, false, payload).await?;
        sent += 1;
    }

    client.disconnect().await?;
    // queued publishes are written before the disconnect
    match tokio::time::timeout(DISCONNECT_TIMEOUT, &mut pump).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => log::debug!("connection closed on disconnect: {}", e),
        Ok(Err(e)) => log::warn!("event loop task failed: {}", e),
        Err(_) => {
            log::warn!("disconnect not flushed within {:?}", DISCONNECT_TIMEOUT);
            pump.abort();
        }
    }
    log::info!("published {} frames", sent);
    Ok(())
}
