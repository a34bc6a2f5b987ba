use playlist_export::parse_library;
use serde::Serialize;
use std::env;
use std::process::ExitCode;

#[derive(Serialize)]
struct PlaylistSummary<'a> {
    name: &'a str,
    persistent_id: Option<&'a str>,
    is_folder: bool,
    tracks: usize,
    missing_tracks: usize,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: list_playlists <library.xml> [--json]");
        return ExitCode::FAILURE;
    }
    let json = args.iter().skip(2).any(|a| a == "--json");

    let catalog = match parse_library(&args[1]) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading library: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let summaries: Vec<PlaylistSummary> = catalog
        .playlists
        .iter()
        .map(|p| PlaylistSummary {
            name: &p.name,
            persistent_id: p.persistent_id.as_deref(),
            is_folder: p.is_folder,
            tracks: p.items.len(),
            missing_tracks: p.items.iter().filter(|id| catalog.track(**id).is_none()).count(),
        })
        .collect();

    if json {
        match serde_json::to_string_pretty(&summaries) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing playlists: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!(
        "iTunes {} | {} playlists | {} tracks",
        catalog.application_version,
        catalog.playlists.len(),
        catalog.tracks.len()
    );
    for s in &summaries {
        let kind = if s.is_folder { "folder" } else { "playlist" };
        print!("{:>6}  {:<8}  {}", s.tracks, kind, s.name);
        if s.missing_tracks > 0 {
            print!("  ({} missing)", s.missing_tracks);
        }
        println!();
    }
    ExitCode::SUCCESS
}
