// CLI entry point for the string-light generator.
//
// Loads a collider scene (and optionally a generation config) from JSON,
// places a string-light node at `--origin` looking along `--forward`, runs
// one generation with a seeded `LightRng`, and writes the mesh. The output
// format follows the `--output` extension: `.json` writes the raw buffers,
// anything else writes Wavefront OBJ. Without `--output` the OBJ goes to
// stdout; logs always go to stderr.
//
// Usage:
//   string-light --scene <scene.json> [OPTIONS]
//     --config <config.json>  Generation config (default: built-in defaults)
//     --origin <x,y,z>        Node position (default: 0,0,0)
//     --forward <x,y,z>       Cast direction (default: 0,0,1)
//     --seed <N>              PRNG seed (default: 0)
//     --repeated              Chain segments until a cast misses
//     --output <path>         Output file, .obj or .json (default: stdout OBJ)
//
// Log verbosity follows RUST_LOG (default: info).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use glam::Vec3;
use string_light_mesh::config::GenerationConfig;
use string_light_mesh::export::{JsonSink, ObjSink};
use string_light_mesh::generator::{GenerationStats, StringLight};
use string_light_mesh::host::MeshSink;
use string_light_mesh::scene::Scene;
use string_light_mesh::transform::NodeTransform;
use string_light_prng::LightRng;

#[derive(Debug, PartialEq)]
struct CliArgs {
    scene: PathBuf,
    config: Option<PathBuf>,
    origin: Vec3,
    forward: Vec3,
    seed: u64,
    repeated: bool,
    output: Option<PathBuf>,
}

/// Parse command-line arguments (without the program name). Uses plain
/// string matching, no clap dependency.
fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut scene = None;
    let mut config = None;
    let mut origin = Vec3::ZERO;
    let mut forward = Vec3::Z;
    let mut seed = 0;
    let mut repeated = false;
    let mut output = None;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .with_context(|| format!("{flag} requires a value"))
        };
        match flag.as_str() {
            "--scene" => scene = Some(PathBuf::from(value()?)),
            "--config" => config = Some(PathBuf::from(value()?)),
            "--origin" => origin = parse_vec3(value()?).context("--origin expects x,y,z")?,
            "--forward" => forward = parse_vec3(value()?).context("--forward expects x,y,z")?,
            "--seed" => {
                let raw = value()?;
                seed = raw
                    .parse()
                    .with_context(|| format!("--seed expects an integer, got {raw:?}"))?;
            }
            "--repeated" => repeated = true,
            "--output" => output = Some(PathBuf::from(value()?)),
            other => bail!("unknown argument: {other}"),
        }
    }

    let Some(scene) = scene else {
        bail!("--scene <scene.json> is required");
    };
    if forward.length_squared() == 0.0 {
        bail!("--forward must be a non-zero vector");
    }
    Ok(CliArgs {
        scene,
        config,
        origin,
        forward,
        seed,
        repeated,
        output,
    })
}

/// Parse `x,y,z` into a vector.
fn parse_vec3(raw: &str) -> Result<Vec3> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid number in {raw:?}"))?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => bail!("expected 3 components, got {}", parts.len()),
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Run the generator into `sink` and flush whatever it wrote.
fn emit<S>(light: &StringLight, scene: &Scene, seed: u64, sink: &mut S) -> Result<GenerationStats>
where
    S: MeshSink,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let mut rng = LightRng::new(seed);
    let stats = light
        .awake(scene, &mut rng, sink)
        .context("failed to write mesh")?;
    Ok(stats)
}

/// Output file that is only created on the first write, so a run whose
/// mesh is discarded leaves nothing on disk.
struct LazyFile {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl LazyFile {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            file: None,
        }
    }

    fn open(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        match self.file {
            Some(ref mut file) => Ok(file),
            None => Ok(self.file.insert(BufWriter::new(File::create(&self.path)?))),
        }
    }
}

impl Write for LazyFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.open()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Generate into `path`, as JSON or OBJ by extension.
fn write_file(
    light: &StringLight,
    scene: &Scene,
    seed: u64,
    path: &Path,
) -> Result<GenerationStats> {
    let writer = LazyFile::new(path);
    if is_json_path(path) {
        emit(light, scene, seed, &mut JsonSink::new(writer))
    } else {
        emit(light, scene, seed, &mut ObjSink::new(writer, "string_light"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let scene = Scene::load(&args.scene)
        .with_context(|| format!("loading scene {}", args.scene.display()))?;
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GenerationConfig::default(),
    };
    config.repeated |= args.repeated;
    tracing::info!(
        colliders = scene.colliders.len(),
        seed = args.seed,
        repeated = config.repeated,
        "generating string light"
    );

    let light = StringLight::new(config, NodeTransform::looking_along(args.origin, args.forward));

    let stats = match &args.output {
        Some(path) => write_file(&light, &scene, args.seed, path)
            .with_context(|| format!("writing output {}", path.display()))?,
        None => {
            let stdout = std::io::stdout().lock();
            let mut sink = ObjSink::new(BufWriter::new(stdout), "string_light");
            let stats = emit(&light, &scene, args.seed, &mut sink)?;
            sink.into_inner().flush()?;
            stats
        }
    };

    if stats.discarded(&light.config) {
        tracing::warn!(stop = ?stats.stop, "span too short, no mesh written");
    } else if stats.segments == 0 {
        tracing::warn!("no surface in front of the origin, wrote an empty mesh");
    }
    Ok(())
}
