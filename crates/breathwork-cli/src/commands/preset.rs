use breathwork_core::Preset;
use clap::Subcommand;
use serde::Serialize;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List every preset with its phase durations
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one preset
    Show {
        /// Preset name (calm, box-breathing, coffee)
        preset: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct PresetInfo {
    key: &'static str,
    title: &'static str,
    description: &'static str,
    inhale_secs: u32,
    hold_secs: u32,
    exhale_secs: u32,
    cycle_secs: u32,
    session_secs: u32,
}

impl From<Preset> for PresetInfo {
    fn from(preset: Preset) -> Self {
        let d = preset.durations();
        Self {
            key: preset.key(),
            title: preset.title(),
            description: preset.description(),
            inhale_secs: d.inhale_secs,
            hold_secs: d.hold_secs,
            exhale_secs: d.exhale_secs,
            cycle_secs: preset.cycle_secs(),
            session_secs: preset.session_secs(),
        }
    }
}

fn print_row(info: &PresetInfo) {
    println!(
        "{:<15} {:>6} {:>6} {:>6} {:>8}",
        info.key,
        format!("{}s", info.inhale_secs),
        format!("{}s", info.hold_secs),
        format!("{}s", info.exhale_secs),
        format!("{}s", info.session_secs),
    );
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PresetAction::List { json } => {
            let infos: Vec<PresetInfo> = Preset::ALL.into_iter().map(PresetInfo::from).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&infos)?);
            } else {
                println!(
                    "{:<15} {:>6} {:>6} {:>6} {:>8}",
                    "PRESET", "INHALE", "HOLD", "EXHALE", "SESSION"
                );
                for info in &infos {
                    print_row(info);
                }
            }
        }
        PresetAction::Show { preset, json } => {
            let preset: Preset = preset.parse()?;
            let info = PresetInfo::from(preset);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", info.title);
                println!("{}", info.description);
                println!(
                    "Inhale {}s, hold {}s, exhale {}s; {} cycles of {}s",
                    info.inhale_secs,
                    info.hold_secs,
                    info.exhale_secs,
                    breathwork_core::SESSION_CYCLES,
                    info.cycle_secs,
                );
            }
        }
    }
    Ok(())
}
