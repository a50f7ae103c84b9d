use crate::history::{DailyStat, HistoryDoc};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
pub struct Deltas {
    pub towns: i64,
    pub nations: i64,
    pub residents: i64,
    pub online: i64,
}

#[derive(Debug, Serialize)]
pub struct HistoryOverview {
    pub last_7_days: Vec<DailyStat>,
    pub day_change: Deltas,
    pub week_change: Deltas,
}

pub fn build_overview(doc: &HistoryDoc) -> HistoryOverview {
    build_overview_at(Utc::now().date_naive(), doc)
}

/// Chart series and headline deltas. Days with no snapshot come back
/// zero-filled so the chart always spans a full week.
pub fn build_overview_at(today: NaiveDate, doc: &HistoryDoc) -> HistoryOverview {
    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        let key = date.to_string();
        let stat = doc.entry(&key).cloned().unwrap_or(DailyStat {
            date: key,
            ..DailyStat::default()
        });
        last_7_days.push(stat);
    }

    HistoryOverview {
        day_change: deltas(doc, today, 1),
        week_change: deltas(doc, today, 7),
        last_7_days,
    }
}

/// Change between today's entry and the one `span` days back. Either end
/// missing means no claim is made, so the tiles render nothing instead of
/// a made-up figure.
fn deltas(doc: &HistoryDoc, today: NaiveDate, span: i64) -> Deltas {
    let current = doc.entry(&today.to_string());
    let baseline = doc.entry(&(today - Duration::days(span)).to_string());
    match (current, baseline) {
        (Some(current), Some(baseline)) => Deltas {
            towns: i64::from(current.towns) - i64::from(baseline.towns),
            nations: i64::from(current.nations) - i64::from(baseline.nations),
            residents: i64::from(current.residents) - i64::from(baseline.residents),
            online: i64::from(current.online) - i64::from(baseline.online),
        },
        _ => Deltas::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(date: &str, towns: u32, residents: u32) -> DailyStat {
        DailyStat {
            date: date.to_string(),
            towns,
            nations: 400,
            residents,
            online: 100,
        }
    }

    #[test]
    fn overview_fills_missing_days_with_zeros() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 11).unwrap();
        let mut doc = HistoryDoc::default();
        doc.record(stat("2026-02-09", 3000, 28000), "t");

        let overview = build_overview_at(today, &doc);
        assert_eq!(overview.last_7_days.len(), 7);
        assert_eq!(overview.last_7_days[0].date, "2026-02-05");
        assert_eq!(overview.last_7_days[6].date, "2026-02-11");

        let filled = overview
            .last_7_days
            .iter()
            .find(|day| day.date == "2026-02-09")
            .unwrap();
        assert_eq!(filled.towns, 3000);
        assert_eq!(overview.last_7_days[6].towns, 0);
    }

    #[test]
    fn overview_computes_day_and_week_deltas() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 11).unwrap();
        let mut doc = HistoryDoc::default();
        doc.record(stat("2026-02-04", 3000, 28000), "t1");
        doc.record(stat("2026-02-10", 3040, 28100), "t2");
        doc.record(stat("2026-02-11", 3050, 28090), "t3");

        let overview = build_overview_at(today, &doc);
        assert_eq!(overview.day_change.towns, 10);
        assert_eq!(overview.day_change.residents, -10);
        assert_eq!(overview.week_change.towns, 50);
        assert_eq!(overview.week_change.residents, 90);
    }

    #[test]
    fn deltas_stay_zero_when_baseline_missing() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 11).unwrap();
        let mut doc = HistoryDoc::default();
        doc.record(stat("2026-02-11", 3050, 28090), "t");

        let overview = build_overview_at(today, &doc);
        assert_eq!(overview.day_change.towns, 0);
        assert_eq!(overview.week_change.residents, 0);
    }
}
