// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Sample library discovery.
//!
//! Walks the source tree and emits one record per audio file. Directory
//! entries are visited in sorted order so two scans of the same tree always
//! produce the same discovery order, which downstream grouping treats as
//! significant.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::chain::AudioSampleRecord;

/// File extensions recognized as audio samples.
pub const AUDIO_EXTENSIONS: [&str; 4] = ["wav", "flac", "aiff", "mp3"];

/// Tokens stripped from file names when deriving the hi-hat pairing base
/// name.
const HIHAT_TOKENS: [&str; 4] = ["closedhh", "openhh", "closed", "open"];

/// Recursively scans root for audio files, skipping excluded directory names
/// (case-insensitive) and files without a recognized audio extension.
pub fn scan(root: &Path, exclude_dirs: &[String]) -> Result<Vec<AudioSampleRecord>, std::io::Error> {
    let mut records = Vec::new();
    scan_dir(root, &mut Vec::new(), exclude_dirs, &mut records)?;
    debug!(records = records.len(), root = ?root, "Scan complete");
    Ok(records)
}

fn scan_dir(
    dir: &Path,
    group_path: &mut Vec<String>,
    exclude_dirs: &[String],
    records: &mut Vec<AudioSampleRecord>,
) -> Result<(), std::io::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        if path.is_dir() {
            if exclude_dirs.iter().any(|e| e.eq_ignore_ascii_case(&name)) {
                debug!(dir = ?path, "Skipping excluded directory");
                continue;
            }
            group_path.push(name);
            scan_dir(&path, group_path, exclude_dirs, records)?;
            group_path.pop();
        } else if is_audio_file(&path) {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            records.push(AudioSampleRecord::new(
                path.clone(),
                group_path.clone(),
                base_name(stem),
            ));
        }
    }

    Ok(())
}

/// Whether the file has a recognized audio extension (case-insensitive).
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Derives the hi-hat pairing base name from a file stem: tokens are split
/// on spaces, underscores, and dashes; hi-hat markers are dropped anywhere;
/// numeric variant suffixes are dropped from the end. Falls back to the full
/// stem if everything is stripped away.
pub fn base_name(stem: &str) -> String {
    let mut tokens: Vec<&str> = stem
        .split([' ', '_', '-'])
        .filter(|t| !t.is_empty())
        .filter(|t| {
            let lower = t.to_lowercase();
            !HIHAT_TOKENS.contains(&lower.as_str())
        })
        .collect();

    while tokens
        .last()
        .is_some_and(|t| t.chars().all(|c| c.is_ascii_digit()))
    {
        tokens.pop();
    }

    if tokens.is_empty() {
        stem.to_string()
    } else {
        tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    #[test]
    fn test_scan_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("drums/kick/kick2.wav"));
        touch(&root.join("drums/kick/kick1.WAV"));
        touch(&root.join("drums/kick/notes.txt"));
        touch(&root.join("drums/snare/snare.flac"));
        touch(&root.join("synth/lead.aiff"));
        touch(&root.join("vocals/chop.mp3"));
        touch(&root.join("cover.jpg"));

        let records = scan(root, &[]).unwrap();
        let names: Vec<&str> = records
            .iter()
            .map(|r| r.path().file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(
            names,
            vec![
                "kick1.WAV",
                "kick2.wav",
                "snare.flac",
                "lead.aiff",
                "chop.mp3"
            ]
        );
        assert_eq!(
            records[0].relative_group_path(),
            &["drums".to_string(), "kick".to_string()]
        );
    }

    #[test]
    fn test_scan_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for name in ["b.wav", "a.wav", "c.wav"] {
            touch(&root.join(name));
        }

        let first: Vec<_> = scan(root, &[])
            .unwrap()
            .iter()
            .map(|r| r.path().to_path_buf())
            .collect();
        let second: Vec<_> = scan(root, &[])
            .unwrap()
            .iter()
            .map(|r| r.path().to_path_buf())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_excluded_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Loops/loop1.wav"));
        touch(&root.join("loops/nested/loop2.wav"));
        touch(&root.join("drums/kick.wav"));

        let records = scan(root, &["Loops".to_string()]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].path().file_name().unwrap().to_str().unwrap(),
            "kick.wav"
        );
    }

    #[test]
    fn test_empty_directories_produce_no_records() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("drums/kick")).unwrap();

        let records = scan(dir.path(), &[]).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_root_files_have_empty_group_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("lone.wav"));

        let records = scan(dir.path(), &[]).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].relative_group_path().is_empty());
    }

    #[test]
    fn test_base_name_strips_markers_and_suffixes() {
        assert_eq!(base_name("acme_closedhh_01"), "acme");
        assert_eq!(base_name("acme open 2"), "acme");
        assert_eq!(base_name("Rock-Kit-Closed-3"), "Rock Kit");
        assert_eq!(base_name("kick1"), "kick1");
        assert_eq!(base_name("909_hat_12"), "909 hat");
    }

    #[test]
    fn test_base_name_falls_back_to_stem() {
        assert_eq!(base_name("closedhh"), "closedhh");
        assert_eq!(base_name("open_01"), "open_01");
    }
}
