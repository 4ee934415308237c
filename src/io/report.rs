use csv_async::AsyncWriter;
use futures::io::AsyncWrite;

use super::error::ReportError;
use crate::domain::AggregateResult;

/// Write per-category counts as `category,count` CSV, sorted by category
pub async fn write_report<W>(result: &AggregateResult, writer: W) -> Result<(), ReportError>
where
    W: AsyncWrite + Unpin,
{
    let mut csv = AsyncWriter::from_writer(writer);

    csv.write_record(&["category", "count"]).await?;
    for (category, count) in result.sorted() {
        csv.write_record(&[category, count.to_string().as_str()]).await?;
    }

    csv.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn writes_header_for_empty_result() {
        let mut output = Vec::new();

        write_report(&AggregateResult::default(), &mut output)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "category,count\n");
    }

    #[tokio::test]
    async fn writes_rows_sorted_by_category() {
        let result = AggregateResult {
            counts: HashMap::from([
                ("Patient".to_string(), 2),
                ("Encounter".to_string(), 5),
                ("Observation".to_string(), 11),
            ]),
            ..AggregateResult::default()
        };
        let mut output = Vec::new();

        write_report(&result, &mut output).await.unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "category,count\nEncounter,5\nObservation,11\nPatient,2\n"
        );
    }
}
