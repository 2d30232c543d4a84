use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use crate::parser::canto::{Canto, Counts, WorkPart};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub cantica: WorkPart,
    pub canto: u32,
    pub file: String,
    pub counts: Counts,
}

/// Work-level index of every closed canto, in closing order.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub pdf: String,
    pub outdir: String,
    pub canti: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(pdf: &str, outdir: &Path) -> Self {
        Manifest {
            pdf: pdf.to_string(),
            outdir: outdir.display().to_string(),
            canti: Vec::new(),
        }
    }

    pub fn push(&mut self, canto: &Canto, file: &Path) {
        self.canti.push(ManifestEntry {
            cantica: canto.part,
            canto: canto.number,
            file: file.display().to_string(),
            counts: canto.counts,
        });
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub manifest: String,
    pub count_canti: usize,
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = to_json(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}

/// Write one file per canto (in parallel) and then the manifest.
pub fn write_all(cantos: &[Canto], pdf: &str, outdir: &Path) -> Result<RunSummary> {
    std::fs::create_dir_all(outdir).with_context(|| format!("Failed to create {:?}", outdir))?;

    let pb = ProgressBar::new(cantos.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} canti")?
            .progress_chars("#>-"),
    );

    let paths: Vec<PathBuf> = cantos
        .par_iter()
        .map(|canto| {
            let path = outdir.join(canto.id().file_name());
            write_json(&path, canto)?;
            pb.inc(1);
            Ok(path)
        })
        .collect::<Result<_>>()?;
    pb.finish_and_clear();

    let mut manifest = Manifest::new(pdf, outdir);
    for (canto, path) in cantos.iter().zip(&paths) {
        manifest.push(canto, path);
    }
    let manifest_path = outdir.join(MANIFEST_FILE);
    write_json(&manifest_path, &manifest)?;

    Ok(RunSummary {
        manifest: manifest_path.display().to_string(),
        count_canti: manifest.canti.len(),
    })
}
