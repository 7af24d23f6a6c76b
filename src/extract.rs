//! Чтение исходного CSV в таблицу кампаний

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{PipelineError, TransformError};
use crate::types::{CampaignTable, Column};

/// Чтение CSV-файла с заголовком
pub fn read_csv(path: impl AsRef<Path>) -> Result<CampaignTable, PipelineError> {
    let path = path.as_ref();
    let wrap = |source| PipelineError::Extract {
        path: path.to_path_buf(),
        source,
    };
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(wrap)?;
    let (headers, cells) = read_cells(reader).map_err(wrap)?;
    let table = build_table(headers, cells)?;

    tracing::info!(
        "Extracted {} rows x {} columns from {}",
        table.n_rows(),
        table.n_columns(),
        path.display()
    );
    Ok(table)
}

/// Чтение CSV из произвольного источника
pub fn read_csv_from<R: Read>(source: R) -> Result<CampaignTable, PipelineError> {
    let reader = ReaderBuilder::new().has_headers(true).from_reader(source);
    let (headers, cells) = read_cells(reader)?;
    Ok(build_table(headers, cells)?)
}

fn read_cells<R: Read>(mut reader: csv::Reader<R>) -> Result<(Vec<String>, Vec<Vec<String>>), csv::Error> {
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or_default().to_string());
        }
    }
    Ok((headers, cells))
}

fn build_table(headers: Vec<String>, cells: Vec<Vec<String>>) -> Result<CampaignTable, TransformError> {
    let mut table = CampaignTable::new();
    for (name, values) in dedup_headers(headers).into_iter().zip(cells) {
        table.insert(name, infer_column(values))?;
    }
    Ok(table)
}

/// Повторяющиеся заголовки получают суффиксы `.1`, `.2`, ... как в pandas
pub fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut result = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{header}.{suffix}");
            suffix += 1;
        }
        if name != header {
            tracing::warn!("Duplicate CSV header `{}` renamed to `{}`", header, name);
        }
        seen.insert(name.clone());
        result.push(name);
    }
    result
}

/// Вывод типа колонки: целые без пропусков -> Int, числа с пропусками -> Float, иначе Text
pub fn infer_column(values: Vec<String>) -> Column {
    let non_empty = || values.iter().filter(|v| !v.trim().is_empty());

    if non_empty().next().is_none() {
        return Column::Text(values);
    }

    let has_missing = values.iter().any(|v| v.trim().is_empty());
    if !has_missing && non_empty().all(|v| v.trim().parse::<i64>().is_ok()) {
        return Column::Int(values.iter().filter_map(|v| v.trim().parse().ok()).collect());
    }

    if non_empty().all(|v| v.trim().parse::<f64>().is_ok()) {
        return Column::Float(
            values
                .iter()
                .map(|v| v.trim().parse::<f64>().ok().filter(|x| !x.is_nan()))
                .collect(),
        );
    }

    Column::Text(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn infers_integer_float_and_text() {
        assert_eq!(infer_column(strings(&["1", "2", "30"])), Column::Int(vec![1, 2, 30]));
        assert_eq!(
            infer_column(strings(&["1", "", "2.5"])),
            Column::Float(vec![Some(1.0), None, Some(2.5)])
        );
        assert_eq!(
            infer_column(strings(&["30days", "15days"])),
            Column::Text(strings(&["30days", "15days"]))
        );
        assert_eq!(
            infer_column(strings(&["$1,200.50"])),
            Column::Text(strings(&["$1,200.50"]))
        );
    }

    #[test]
    fn mixed_numeric_and_garbage_stays_text() {
        assert_eq!(
            infer_column(strings(&["5.2", "n/a"])),
            Column::Text(strings(&["5.2", "n/a"]))
        );
    }

    #[test]
    fn reads_headers_and_keeps_column_order() {
        let data = "Campaign_ID,Target_Audience,ROI,Clicks\n\
                    1,Men 25-34,5.2,100\n\
                    2,All Ages,3.1,250\n";
        let table = read_csv_from(data.as_bytes()).unwrap();

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["Campaign_ID", "Target_Audience", "ROI", "Clicks"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("Clicks"), Some(&Column::Int(vec![100, 250])));
        assert_eq!(
            table.column("ROI"),
            Some(&Column::Float(vec![Some(5.2), Some(3.1)]))
        );
    }

    #[test]
    fn duplicate_headers_are_kept_apart() {
        let data = "ROI,Clicks,ROI,ROI.1,ROI\n1,10,2,3,4\n";
        let table = read_csv_from(data.as_bytes()).unwrap();

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["ROI", "Clicks", "ROI.1", "ROI.1.1", "ROI.2"]);
        assert_eq!(table.column("ROI"), Some(&Column::Int(vec![1])));
        assert_eq!(table.column("ROI.1"), Some(&Column::Int(vec![2])));
        assert_eq!(table.column("ROI.1.1"), Some(&Column::Int(vec![3])));
        assert_eq!(table.column("ROI.2"), Some(&Column::Int(vec![4])));
    }

    #[test]
    fn ragged_rows_are_a_csv_error() {
        let data = "ROI,Clicks\n1,10\n2\n";
        assert!(matches!(read_csv_from(data.as_bytes()), Err(PipelineError::Csv(_))));
    }

    #[test]
    fn read_csv_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Extract { .. }));
    }
}
