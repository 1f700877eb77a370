//! Form-compatible exports of extracted fields.

use serde::ser::{Serialize, SerializeMap, Serializer};

use docfill_core::{FieldMap, FieldMetadata, SourceMap};

/// Output format for extracted fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON object of label → value
    Json,
    /// Field,Value CSV
    Csv,
    /// "Label: value" lines
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Field map keyed by form label, in form order.
struct Labeled<'a>(&'a FieldMap);

impl Serialize for Labeled<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(kind, value)| (kind.label(), value)))
    }
}

struct LabeledSources<'a>(&'a SourceMap);

impl Serialize for LabeledSources<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (kind, meta) in self.0 {
            map.serialize_entry(kind.label(), meta)?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct WithSources<'a> {
    fields: Labeled<'a>,
    sources: LabeledSources<'a>,
}

/// Render fields (and optionally their sources) in the given format.
pub fn format_fields(
    fields: &FieldMap,
    sources: Option<&SourceMap>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    if fields.is_empty() {
        anyhow::bail!("No data to export");
    }

    match format {
        OutputFormat::Json => format_json(fields, sources),
        OutputFormat::Csv => format_csv(fields, sources),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_json(fields: &FieldMap, sources: Option<&SourceMap>) -> anyhow::Result<String> {
    let json = match sources {
        Some(sources) => serde_json::to_string_pretty(&WithSources {
            fields: Labeled(fields),
            sources: LabeledSources(sources),
        })?,
        None => serde_json::to_string_pretty(&Labeled(fields))?,
    };
    Ok(json)
}

fn format_csv(fields: &FieldMap, sources: Option<&SourceMap>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match sources {
        None => {
            wtr.write_record(["Field", "Value"])?;
            for (kind, value) in fields {
                wtr.write_record([kind.label(), value.as_str()])?;
            }
        }
        Some(sources) => {
            wtr.write_record(["Field", "Value", "Page", "Line", "Source"])?;
            for (kind, value) in fields {
                let (page, line, text) = source_columns(sources.get(kind));
                wtr.write_record([kind.label(), value.as_str(), page.as_str(), line.as_str(), text.as_str()])?;
            }
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn source_columns(meta: Option<&FieldMetadata>) -> (String, String, String) {
    match meta {
        Some(meta) => (
            meta.source_page.map(|p| p.to_string()).unwrap_or_default(),
            meta.source_line_no.map(|l| l.to_string()).unwrap_or_default(),
            meta.source_text.clone(),
        ),
        None => Default::default(),
    }
}

fn format_text(fields: &FieldMap) -> String {
    let mut output = String::new();
    for (kind, value) in fields {
        output.push_str(&format!("{}: {}\n", kind.label(), value));
    }
    output
}

/// Human-readable location of a source line.
pub fn describe_source(meta: &FieldMetadata) -> String {
    match (meta.source_page, meta.source_line_no) {
        (Some(page), Some(line)) => format!("page {}, line {}", page, line),
        (None, Some(line)) => format!("line {}", line),
        _ => "-".to_string(),
    }
}
