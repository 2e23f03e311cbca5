use crate::cert::CertificateColumn;
use std::fmt::Display;

/// Types that can be rendered as a row of the certificate table
pub trait GetColumnValue {
    fn get_column_value(&self, column: &CertificateColumn) -> String;
}

/// Output format configuration
#[derive(Clone, Debug)]
pub struct OutputFormat {
    /// Tab-separated, without headers
    pub raw: bool,
}

/// Build table rows from certificates and columns
pub fn build_table_data<T>(certificates: &[T], columns: &[CertificateColumn]) -> Vec<Vec<String>>
where
    T: GetColumnValue,
{
    certificates
        .iter()
        .map(|cert| columns.iter().map(|col| cert.get_column_value(col)).collect())
        .collect()
}

/// Parse a comma separated column list, e.g. `id,cn,not_after`.
/// A leading `+` appends to the default columns.
pub fn parse_columns(columns_str: Option<&str>) -> Result<Vec<CertificateColumn>, String> {
    let Some(columns_str) = columns_str else {
        return Ok(CertificateColumn::defaults());
    };

    let (mut columns, list) = match columns_str.strip_prefix('+') {
        Some(rest) => (CertificateColumn::defaults(), rest),
        None => (Vec::new(), columns_str),
    };
    for col in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        columns.push(col.parse()?);
    }
    Ok(columns)
}

impl OutputFormat {
    pub fn new(raw: bool) -> Self {
        Self { raw }
    }

    /// Print certificates; formatted output gets a header row
    pub fn print_certificates<T: GetColumnValue>(
        &self,
        certificates: &[T],
        columns: &[CertificateColumn],
    ) {
        let mut data: Vec<Vec<String>> = Vec::with_capacity(certificates.len() + 1);
        if !self.raw && !certificates.is_empty() {
            data.push(columns.iter().map(|c| c.header().to_string()).collect());
        }
        data.extend(build_table_data(certificates, columns));
        self.print_table(&data);
    }

    pub fn print_table<T>(&self, data: &[Vec<T>])
    where
        T: Display + AsRef<str>,
    {
        print!("{}", self.render_table(data));
    }

    /// Print key-value pairs
    pub fn print_key_value<K, V>(&self, pairs: &[(K, V)])
    where
        K: Display,
        V: Display,
    {
        let data: Vec<Vec<String>> = pairs
            .iter()
            .map(|(k, v)| vec![k.to_string(), v.to_string()])
            .collect();

        self.print_table(&data);
    }

    /// Render rows: tab-separated when raw, column-aligned like `column -t` otherwise
    pub fn render_table<T>(&self, data: &[Vec<T>]) -> String
    where
        T: Display + AsRef<str>,
    {
        if self.raw {
            return data
                .iter()
                .map(|row| {
                    let cells: Vec<&str> = row.iter().map(AsRef::as_ref).collect();
                    format!("{}\n", cells.join("\t"))
                })
                .collect();
        }

        let num_cols = data.iter().map(Vec::len).max().unwrap_or(0);
        let mut col_widths = vec![0; num_cols];
        for row in data {
            for (i, cell) in row.iter().enumerate() {
                col_widths[i] = col_widths[i].max(cell.as_ref().chars().count());
            }
        }

        let mut out = String::new();
        for row in data {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i == row.len() - 1 {
                        cell.to_string()
                    } else {
                        format!("{:<width$}", cell.as_ref(), width = col_widths[i])
                    }
                })
                .collect();
            out.push_str(&cells.join("  "));
            out.push('\n');
        }
        out
    }
}
