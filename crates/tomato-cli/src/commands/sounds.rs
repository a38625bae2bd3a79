use serde::Serialize;
use tomato_core::storage::sounds_dir;
use tomato_core::AmbientSound;

#[derive(Serialize)]
struct SoundEntry {
    id: &'static str,
    label: &'static str,
    file: &'static str,
    installed: bool,
}

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let dir = sounds_dir()?;
    let entries: Vec<SoundEntry> = AmbientSound::ALL
        .iter()
        .map(|sound| SoundEntry {
            id: sound.id(),
            label: sound.label(),
            file: sound.file_name(),
            installed: sound.path_in(&dir).is_file(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Sounds directory: {}", dir.display());
    for entry in &entries {
        let status = if entry.installed { "installed" } else { "missing" };
        println!("  {:<10} {:<10} {:<14} {status}", entry.id, entry.label, entry.file);
    }
    Ok(())
}
