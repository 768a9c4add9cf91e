#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = native::run() {
        eprintln!("tunnel_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path as FsPath, PathBuf};

    use tunnel_engine::config::{SimulationConfig, TunnelConfig};
    use tunnel_engine::geom::{
        Line3, Path, Point3, SplinePath, TunnelDiagnostics, TunnelMesh, Vec3, tunnel_mesh_from_path,
    };
    use tunnel_engine::simulation::TunnelSimulation;

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;
    const DEFAULT_WANDER_STEPS: usize = 600;
    const WANDER_DELTA_TIME: f64 = 1.0 / 60.0;

    const USAGE: &str = r#"tunnel_cli (tunnel-engine)

USAGE:
  tunnel_cli list
  tunnel_cli run <scenario|all> [options]

SCENARIOS:
  straight_tube          straight 10-unit line, 4 sides, radius 1
  s_curve_spline         spline through an S-shaped knot list
  vertical_degenerate    spline that climbs along its own up vector
  wander_trail           wandering agent trail (simulation)

OPTIONS (run):
  --config <path>    Tunnel config JSON (camelCase keys); overrides scenario defaults
  --steps <n>        Simulation steps for wander_trail (default 600)
  --seed <n>         Wander seed for wander_trail (default 0)
  --out-dir <dir>    Write <scenario>.obj and/or <scenario>.snap to this dir (required for `all`)
  --obj <path>       Write OBJ (single scenario only)
  --snap <path>      Write snapshot (single scenario only)
  --no-obj           Skip OBJ when using --out-dir
  --no-snap          Skip snapshot when using --out-dir
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
    }

    #[derive(Debug, Clone, Default)]
    struct RunSettings {
        config: Option<TunnelConfig>,
        steps: Option<usize>,
        seed: u64,
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut settings = RunSettings::default();
        let mut out_dir: Option<PathBuf> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut write_obj = true;
        let mut write_snap = true;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = PathBuf::from(args.value("--config")?);
                    settings.config = Some(load_config(&path)?);
                }
                "--steps" => settings.steps = Some(args.parsed("--steps")?),
                "--seed" => settings.seed = args.parsed("--seed")?,
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => overwrite = true,
                "--no-obj" => write_obj = false,
                "--no-snap" => write_snap = false,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        if let Some(dir) = out_dir.as_ref() {
            if obj_path.is_some() || snap_path.is_some() {
                return Err("use either --out-dir or --obj/--snap (not both)".to_string());
            }
            if !write_obj && !write_snap {
                return Err("nothing to write (both --no-obj and --no-snap set)".to_string());
            }

            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

            if scenario_name == "all" {
                for scenario in Scenario::ALL {
                    run_one_scenario_to_dir(*scenario, &settings, dir, write_obj, write_snap, overwrite)?;
                }
                return Ok(());
            }

            let scenario = Scenario::from_name(scenario_name.as_str())
                .ok_or_else(|| unknown_scenario(&scenario_name))?;
            return run_one_scenario_to_dir(scenario, &settings, dir, write_obj, write_snap, overwrite);
        }

        if scenario_name == "all" {
            return Err("`run all` requires --out-dir".to_string());
        }

        let scenario = Scenario::from_name(scenario_name.as_str())
            .ok_or_else(|| unknown_scenario(&scenario_name))?;
        let output = run_scenario(scenario, &settings)?;

        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{}", output.snapshot);
        }

        if let Some(path) = obj_path.as_deref() {
            write_obj_file(path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        report(&output);
        Ok(())
    }

    fn run_one_scenario_to_dir(
        scenario: Scenario,
        settings: &RunSettings,
        dir: &FsPath,
        write_obj: bool,
        write_snap: bool,
        overwrite: bool,
    ) -> Result<(), String> {
        let output = run_scenario(scenario, settings)?;

        if write_snap {
            let path = dir.join(format!("{}.snap", output.name));
            write_text_file(&path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        if write_obj {
            let path = dir.join(format!("{}.obj", output.name));
            write_obj_file(&path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        report(&output);
        Ok(())
    }

    fn report(output: &ScenarioOutput) {
        match output.diagnostics.as_ref() {
            Some(diag) => eprintln!("{}: {}", output.name, diag.summary()),
            None => eprintln!("{}: no geometry", output.name),
        }
    }

    fn load_config(path: &FsPath) -> Result<TunnelConfig, String> {
        let text = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        TunnelConfig::from_json_str(&text).map_err(|e| format!("{}: {e}", path.display()))
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn write_text_file(path: &FsPath, text: &str, overwrite: bool) -> Result<(), String> {
        ensure_writable(path, overwrite)?;
        fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn ensure_writable(path: &FsPath, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        Ok(())
    }

    fn write_obj_file(path: &FsPath, mesh: &TunnelMesh, name: &str, overwrite: bool) -> Result<(), String> {
        mesh.validate().map_err(|e| format!("mesh validation failed: {e}"))?;
        ensure_writable(path, overwrite)?;

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        let io = |e: std::io::Error| format!("write obj: {e}");

        writeln!(w, "# tunnel-engine tunnel_cli").map_err(io)?;
        writeln!(w, "o {name}").map_err(io)?;
        for p in &mesh.positions {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(io)?;
        }
        for uv in &mesh.uvs {
            writeln!(w, "vt {} {}", uv[0], uv[1]).map_err(io)?;
        }
        for n in &mesh.normals {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2]).map_err(io)?;
        }
        for tri in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
            writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}").map_err(io)?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        // Collapses -0.0 to 0.0.
        q + 0.0
    }

    fn write_floats_line(out: &mut String, prefix: &str, values: &[f64]) {
        out.push_str(prefix);
        for value in values {
            let _ = write!(out, " {:.SNAPSHOT_DECIMALS$}", quantize_f64(*value));
        }
        out.push('\n');
    }

    fn write_diagnostics(out: &mut String, diag: &TunnelDiagnostics) {
        let _ = writeln!(out, "diag.ring_count {}", diag.ring_count);
        let _ = writeln!(out, "diag.sides {}", diag.sides);
        let _ = writeln!(out, "diag.vertex_count {}", diag.vertex_count);
        let _ = writeln!(out, "diag.triangle_count {}", diag.triangle_count);
        let _ = writeln!(out, "diag.open_edge_count {}", diag.open_edge_count);
        let _ = writeln!(out, "diag.non_manifold_edge_count {}", diag.non_manifold_edge_count);
        let _ = writeln!(out, "diag.substituted_frame_count {}", diag.substituted_frame_count);
        let _ = writeln!(out, "diag.warning_count {}", diag.warnings.len());
        for (idx, warning) in diag.warnings.iter().enumerate() {
            let _ = writeln!(out, "diag.warning.{idx} {warning}");
        }
    }

    fn write_mesh(out: &mut String, mesh: &TunnelMesh) {
        match mesh.bounds {
            Some(bounds) => {
                write_floats_line(out, "mesh.bounds.min", &bounds.min.to_array());
                write_floats_line(out, "mesh.bounds.max", &bounds.max.to_array());
            }
            None => {
                let _ = writeln!(out, "mesh.bounds none");
            }
        }

        let _ = writeln!(out, "mesh.positions {}", mesh.positions.len());
        for p in &mesh.positions {
            write_floats_line(out, "v", p);
        }
        let _ = writeln!(out, "mesh.normals {}", mesh.normals.len());
        for n in &mesh.normals {
            write_floats_line(out, "n", n);
        }
        let _ = writeln!(out, "mesh.uvs {}", mesh.uvs.len());
        for uv in &mesh.uvs {
            write_floats_line(out, "uv", uv);
        }
        let _ = writeln!(out, "mesh.indices {}", mesh.indices.len());
        for tri in mesh.indices.chunks_exact(3) {
            let _ = writeln!(out, "f {} {} {}", tri[0], tri[1], tri[2]);
        }
    }

    fn snapshot(scenario: &str, config: &TunnelConfig, sections: impl FnOnce(&mut String)) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# tunnel-engine snapshot v1");
        let _ = writeln!(out, "scenario {scenario}");
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        let _ = writeln!(
            out,
            "config sides={} radius={} density={} degenerate={:?}",
            config.sides, config.radius, config.segments_per_unit_length, config.degenerate_frames
        );
        sections(&mut out);
        normalize_snapshot_text(&out)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scenarios
    // ─────────────────────────────────────────────────────────────────────────

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        StraightTube,
        SCurveSpline,
        VerticalDegenerate,
        WanderTrail,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::StraightTube,
            Scenario::SCurveSpline,
            Scenario::VerticalDegenerate,
            Scenario::WanderTrail,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::StraightTube => "straight_tube",
                Scenario::SCurveSpline => "s_curve_spline",
                Scenario::VerticalDegenerate => "vertical_degenerate",
                Scenario::WanderTrail => "wander_trail",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|s| s.name() == name)
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        mesh: TunnelMesh,
        diagnostics: Option<TunnelDiagnostics>,
        snapshot: String,
    }

    fn run_scenario(scenario: Scenario, settings: &RunSettings) -> Result<ScenarioOutput, String> {
        match scenario {
            Scenario::StraightTube => {
                let defaults = TunnelConfig::default().with_sides(4).with_radius(1.0);
                let path = Line3::new(Point3::ORIGIN, Point3::new(0.0, 0.0, 10.0));
                build_path_scenario(scenario, &path, settings.config.unwrap_or(defaults))
            }
            Scenario::SCurveSpline => {
                let path = SplinePath::from_knots(vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(4.0, 0.0, 5.0),
                    Point3::new(0.0, 2.0, 10.0),
                    Point3::new(-4.0, 0.0, 15.0),
                    Point3::new(0.0, 0.0, 20.0),
                ]);
                let defaults = TunnelConfig::default().with_radius(1.5).with_segments_per_unit_length(2.0);
                build_path_scenario(scenario, &path, settings.config.unwrap_or(defaults))
            }
            Scenario::VerticalDegenerate => {
                // Runs forward, then climbs straight up along the up vector.
                let path = SplinePath::from_knots(vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(0.0, 0.0, 4.0),
                    Point3::new(0.0, 6.0, 4.0),
                    Point3::new(0.0, 12.0, 4.0),
                ])
                .with_up(Vec3::Y);
                let defaults = TunnelConfig::default().with_sides(6).with_radius(1.0);
                build_path_scenario(scenario, &path, settings.config.unwrap_or(defaults))
            }
            Scenario::WanderTrail => wander_trail(settings),
        }
    }

    fn build_path_scenario<P: Path>(
        scenario: Scenario,
        path: &P,
        config: TunnelConfig,
    ) -> Result<ScenarioOutput, String> {
        let name = scenario.name();
        let (mesh, diag) = tunnel_mesh_from_path(path, &config).map_err(|e| format!("{name}: {e}"))?;
        let snapshot = snapshot(name, &config, |out| {
            write_floats_line(out, "path.length", &[path.length()]);
            write_diagnostics(out, &diag);
            write_mesh(out, &mesh);
        });
        Ok(ScenarioOutput {
            name,
            mesh,
            diagnostics: Some(diag),
            snapshot,
        })
    }

    fn wander_trail(settings: &RunSettings) -> Result<ScenarioOutput, String> {
        let name = Scenario::WanderTrail.name();
        let config = SimulationConfig {
            seed: settings.seed,
            tunnel: settings.config.unwrap_or_default(),
            ..SimulationConfig::default()
        };
        let mut simulation = TunnelSimulation::new(&config).map_err(|e| e.to_string())?;
        let steps = settings.steps.unwrap_or(DEFAULT_WANDER_STEPS);
        let rebuilds = simulation.run(steps, WANDER_DELTA_TIME);
        log::info!("{name}: {steps} steps, {rebuilds} rebuilds");

        let mesh = TunnelMesh::clone(&simulation.mesh());
        let diagnostics = simulation.tunnel().last_diagnostics().cloned();
        let snapshot = snapshot(name, &config.tunnel, |out| {
            let _ = writeln!(out, "sim.seed {}", config.seed);
            let _ = writeln!(out, "sim.steps {steps}");
            let _ = writeln!(out, "sim.rebuilds {rebuilds}");
            let _ = writeln!(out, "sim.generation {}", simulation.tunnel().generation());
            let _ = writeln!(out, "trail.knots {}", simulation.trail().knot_count());
            for knot in simulation.trail().knots() {
                write_floats_line(out, "k", &knot.to_array());
            }
            if let Some(diag) = diagnostics.as_ref() {
                write_diagnostics(out, diag);
            }
            write_mesh(out, &mesh);
        });

        Ok(ScenarioOutput {
            name,
            mesh,
            diagnostics,
            snapshot,
        })
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }

        fn parsed<T: std::str::FromStr>(&mut self, flag: &str) -> Result<T, String> {
            let raw = self.value(flag)?;
            raw.parse()
                .map_err(|_| format!("invalid value `{raw}` for {flag}"))
        }
    }
}
