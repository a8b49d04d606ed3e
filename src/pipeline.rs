use anyhow::{bail, Context, Result};
use glob::{glob_with, MatchOptions, Pattern};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info};

use crate::columns::{resolve_targets, TargetBases};
use crate::config::MergeConfig;
use crate::process::{
    convert::coerce_and_round,
    format::format_column,
    load::load_tagged,
    sort::sort_by_city_and_date,
    write::write_csv,
    Table,
};

/// What a completed run did; printed by the binary and optionally saved as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub input_dir: PathBuf,
    pub files: Vec<String>,
    pub rows: usize,
    pub columns: Vec<String>,
    pub targets: TargetBases,
    pub sorted: bool,
    pub output_file: PathBuf,
}

/// All `*.csv` files directly inside `dir`, in sorted order.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!(
            "input folder '{}' was not found. Check the path.",
            dir.display()
        );
    }

    let pattern = format!("{}/*.csv", Pattern::escape(&dir.to_string_lossy()));
    // `*.csv` must not pick up dotfiles or `.CSV`
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: true,
    };
    let entries =
        glob_with(&pattern, options).with_context(|| format!("bad glob pattern {}", pattern))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        bail!("no .csv file found in '{}'.", dir.display());
    }
    Ok(files)
}

/// Load, tag and concatenate every file into one table.
#[tracing::instrument(level = "info", skip_all, fields(files = files.len()))]
pub fn load_all(files: &[PathBuf]) -> Result<Table> {
    let mut tables = Vec::with_capacity(files.len());
    for path in files {
        let table = load_tagged(path).with_context(|| format!("loading {}", path.display()))?;
        debug!(path = %path.display(), rows = table.num_rows(), "loaded file");
        tables.push(table);
    }
    Ok(Table::concat(tables))
}

/// Round and format every resolved target column except
/// `temperatura_minima_absoluta`.
pub fn format_targets(table: &mut Table, targets: &TargetBases) {
    for col in targets.rounded_columns() {
        if let Some(idx) = table.column_index(col) {
            coerce_and_round(table, idx);
            format_column(table, idx);
        }
    }
}

/// Run the whole merge described by `cfg`.
///
/// Fails when the input folder is missing or holds no CSV files (nothing is
/// written in either case), when a file cannot be read as CSV, or when the
/// output cannot be written.
#[tracing::instrument(level = "info", skip(cfg), fields(input = %cfg.input_dir.display()))]
pub fn run(cfg: &MergeConfig) -> Result<MergeSummary> {
    let start = Instant::now();

    let files = discover_csv_files(&cfg.input_dir)?;
    info!("{} CSV files to merge", files.len());

    let mut table = load_all(&files)?;
    table.normalize_headers();

    let targets = resolve_targets(&table.headers, cfg.match_mode);
    for (field, col) in targets.iter() {
        info!(field = %field, column = ?col, "resolved");
    }

    format_targets(&mut table, &targets);
    let sorted = sort_by_city_and_date(&mut table);

    write_csv(&table, &cfg.output_file).with_context(|| {
        format!("error saving the output file {}", cfg.output_file.display())
    })?;

    let summary = MergeSummary {
        input_dir: cfg.input_dir.clone(),
        files: files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect(),
        rows: table.num_rows(),
        columns: table.headers.clone(),
        targets,
        sorted,
        output_file: cfg.output_file.clone(),
    };

    if let Some(report) = &cfg.report {
        write_report(&summary, report)?;
    }

    info!(rows = summary.rows, elapsed = ?start.elapsed(), "merge done");
    Ok(summary)
}

/// Save `summary` as pretty-printed JSON.
pub fn write_report(summary: &MergeSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).with_context(|| format!("writing report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{MatchMode, TargetField};
    use crate::test_util::init_test_logging;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
        fs::write(dir.join(name), content)?;
        Ok(())
    }

    #[test]
    fn merges_two_city_files() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let input = tmp.path().join("dados_cidades");
        fs::create_dir_all(&input)?;
        write(
            &input,
            "sao_paulo.csv",
            "Cidade,Data,Temperatura Máxima (°C),Precipitação (mm)\nSão Paulo,01/01/2020,25.04,0\n",
        )?;
        write(
            &input,
            "rio.csv",
            "cidade,data,temp_max,precipitacao\nRio,02/01/2020,30,5.55\n",
        )?;
        let output = tmp.path().join("output/dados_processados/merged_cidades.csv");

        let summary = run(&MergeConfig::new(&input, &output))?;

        assert_eq!(summary.files, vec!["rio.csv", "sao_paulo.csv"]);
        assert_eq!(summary.rows, 2);
        assert!(summary.sorted);
        assert_eq!(
            summary.targets.get(TargetField::Precipitacao),
            Some("precipitacao")
        );
        assert_eq!(
            summary.targets.get(TargetField::TemperaturaMaxima),
            Some("temperatura_maxima_c")
        );
        assert_eq!(summary.targets.get(TargetField::TemperaturaMinima), None);

        let written = fs::read_to_string(&output)?;
        let lines: Vec<&str> = written.lines().collect();
        // rio.csv is read first, so its columns lead the union
        assert_eq!(
            lines[0],
            "cidade,data,temp_max,precipitacao,source_file,temperatura_maxima_c,precipitacao_mm"
        );
        assert_eq!(lines[1], "Rio,2020-01-02,30,5.6,rio.csv,,");
        assert_eq!(lines[2], "São Paulo,2020-01-01,,,sao_paulo.csv,25,0");
        assert_eq!(lines.len(), 3);
        Ok(())
    }

    #[test]
    fn exact_target_column_wins_and_minima_absoluta_is_untouched() -> Result<()> {
        let tmp = tempdir()?;
        let input = tmp.path().join("in");
        fs::create_dir_all(&input)?;
        write(
            &input,
            "a.csv",
            "cidade,data,temperatura_maxima_media,temperatura_maxima,temperatura_minima_absoluta,temperatura_minima\n\
             Natal,05/03/2021,31.26,32.04,20.04,21.06\n\
             Natal,04/03/2021,x,31.96,19.5,\n",
        )?;
        let output = tmp.path().join("merged.csv");

        let summary = run(&MergeConfig::new(&input, &output))?;
        assert_eq!(
            summary.targets.get(TargetField::TemperaturaMaxima),
            Some("temperatura_maxima")
        );
        assert_eq!(
            summary.targets.get(TargetField::TemperaturaMinima),
            Some("temperatura_minima")
        );
        assert_eq!(
            summary.targets.get(TargetField::TemperaturaMinimaAbsoluta),
            Some("temperatura_minima_absoluta")
        );

        let written = fs::read_to_string(&output)?;
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines[0],
            "cidade,data,temperatura_maxima_media,temperatura_maxima,temperatura_minima_absoluta,temperatura_minima,source_file"
        );
        // sorted by date; the partial-match column and minima_absoluta keep raw values
        assert_eq!(lines[1], "Natal,2021-03-04,x,32,19.5,,a.csv");
        assert_eq!(lines[2], "Natal,2021-03-05,31.26,32,20.04,21.1,a.csv");
        Ok(())
    }

    #[test]
    fn strict_mode_ignores_embedded_names() -> Result<()> {
        let tmp = tempdir()?;
        let input = tmp.path().join("in");
        fs::create_dir_all(&input)?;
        write(&input, "a.csv", "umidade_precipitacao_relativa\n1.25\n")?;

        let mut cfg = MergeConfig::new(&input, tmp.path().join("loose.csv"));
        let loose = run(&cfg)?;
        assert_eq!(
            loose.targets.get(TargetField::Precipitacao),
            Some("umidade_precipitacao_relativa")
        );
        assert_eq!(
            fs::read_to_string(tmp.path().join("loose.csv"))?,
            "umidade_precipitacao_relativa,source_file\n1.2,a.csv\n"
        );

        cfg.match_mode = MatchMode::Strict;
        cfg.output_file = tmp.path().join("strict.csv");
        let strict = run(&cfg)?;
        assert_eq!(strict.targets.get(TargetField::Precipitacao), None);
        assert_eq!(
            fs::read_to_string(tmp.path().join("strict.csv"))?,
            "umidade_precipitacao_relativa,source_file\n1.25,a.csv\n"
        );
        Ok(())
    }

    #[test]
    fn missing_input_dir_is_fatal_and_writes_nothing() -> Result<()> {
        let tmp = tempdir()?;
        let output = tmp.path().join("out/merged.csv");
        let err = run(&MergeConfig::new(tmp.path().join("nope"), &output)).unwrap_err();
        assert!(err.to_string().contains("was not found"));
        assert!(!output.exists());
        assert!(!tmp.path().join("out").exists());
        Ok(())
    }

    #[test]
    fn input_dir_without_csv_is_fatal_and_writes_nothing() -> Result<()> {
        let tmp = tempdir()?;
        let input = tmp.path().join("in");
        fs::create_dir_all(&input)?;
        write(&input, "notes.txt", "not a csv")?;
        let output = tmp.path().join("out/merged.csv");

        let err = run(&MergeConfig::new(&input, &output)).unwrap_err();
        assert!(err.to_string().contains("no .csv file"));
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn discovery_skips_dotfiles_and_other_extensions() -> Result<()> {
        let tmp = tempdir()?;
        write(tmp.path(), "b.csv", "cidade\nRio\n")?;
        write(tmp.path(), "a.csv", "cidade\nNatal\n")?;
        write(tmp.path(), ".hidden.csv", "cidade\nLixo\n")?;
        write(tmp.path(), "UPPER.CSV", "cidade\nLixo\n")?;
        write(tmp.path(), "notes.txt", "x")?;
        fs::create_dir_all(tmp.path().join("dir.csv"))?;

        let files = discover_csv_files(tmp.path())?;
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        Ok(())
    }

    #[test]
    fn only_hidden_csv_counts_as_no_csv() -> Result<()> {
        let tmp = tempdir()?;
        write(tmp.path(), ".hidden.csv", "cidade\nRio\n")?;
        let err = discover_csv_files(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("no .csv file"));
        Ok(())
    }

    #[test]
    fn output_write_failure_is_fatal() -> Result<()> {
        let tmp = tempdir()?;
        let input = tmp.path().join("in");
        fs::create_dir_all(&input)?;
        write(&input, "a.csv", "cidade\nRio\n")?;
        // a plain file where the output directory should be
        let blocker = tmp.path().join("out");
        fs::write(&blocker, "")?;

        let err = run(&MergeConfig::new(&input, blocker.join("merged.csv"))).unwrap_err();
        assert!(format!("{:#}", err).contains("error saving the output file"));
        Ok(())
    }

    #[test]
    fn report_is_written_as_json() -> Result<()> {
        let tmp = tempdir()?;
        let input = tmp.path().join("in");
        fs::create_dir_all(&input)?;
        write(&input, "a.csv", "cidade,precipitacao\nRio,1\n")?;
        let mut cfg = MergeConfig::new(&input, tmp.path().join("merged.csv"));
        cfg.report = Some(tmp.path().join("reports/run.json"));

        run(&cfg)?;
        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("reports/run.json"))?)?;
        assert_eq!(report["rows"], 1);
        assert_eq!(report["files"][0], "a.csv");
        assert_eq!(report["targets"]["precipitacao"], "precipitacao");
        assert!(report["targets"]["temperatura_maxima"].is_null());
        assert_eq!(report["sorted"], false);
        Ok(())
    }
}
