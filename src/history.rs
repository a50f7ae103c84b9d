use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One day's aggregate counts. Dates are UTC calendar days, keyed as
/// `YYYY-MM-DD` strings so the document stays readable in the gist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DailyStat {
    pub date: String,
    #[serde(default)]
    pub towns: u32,
    #[serde(default)]
    pub nations: u32,
    #[serde(default)]
    pub residents: u32,
    #[serde(default)]
    pub online: u32,
}

/// The shared history blob, identical in the gist and the local file:
/// `{"lastUpdated": ..., "stats": [...]}`. Entries are unique per date and
/// kept sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDoc {
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub stats: Vec<DailyStat>,
}

impl HistoryDoc {
    pub fn entry(&self, date: &str) -> Option<&DailyStat> {
        self.stats.iter().find(|stat| stat.date == date)
    }

    /// The shouldSave-today rule: the first snapshot of a day is recorded,
    /// anything later the same day is a no-op. Returns whether the document
    /// changed, so callers know to persist.
    pub fn record(&mut self, stat: DailyStat, now: &str) -> bool {
        if self.entry(&stat.date).is_some() {
            return false;
        }
        self.stats.push(stat);
        self.stats.sort_by(|a, b| a.date.cmp(&b.date));
        self.last_updated = now.to_string();
        true
    }

    /// Union with a second copy of the document (the other storage tier).
    /// On a date collision the copy with the newer `lastUpdated` wins.
    pub fn merge(&mut self, other: HistoryDoc) {
        let other_newer = newer(&other.last_updated, &self.last_updated);
        for stat in other.stats {
            match self.stats.iter_mut().find(|existing| existing.date == stat.date) {
                Some(existing) => {
                    if other_newer {
                        *existing = stat;
                    }
                }
                None => self.stats.push(stat),
            }
        }
        self.stats.sort_by(|a, b| a.date.cmp(&b.date));
        if other_newer {
            self.last_updated = other.last_updated;
        }
    }

    /// Drops entries that fell out of the rolling window, along with any
    /// entry whose date no longer parses.
    pub fn trim(&mut self, window_days: u32, today: NaiveDate) {
        let cutoff = today - Duration::days(i64::from(window_days) - 1);
        self.stats.retain(|stat| {
            NaiveDate::parse_from_str(&stat.date, "%Y-%m-%d")
                .map(|date| date >= cutoff)
                .unwrap_or(false)
        });
    }
}

fn newer(candidate: &str, reference: &str) -> bool {
    match (
        DateTime::parse_from_rfc3339(candidate),
        DateTime::parse_from_rfc3339(reference),
    ) {
        (Ok(candidate), Ok(reference)) => candidate > reference,
        // unparseable timestamps (hand-edited blobs) fall back to a string compare
        _ => candidate > reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(date: &str, towns: u32) -> DailyStat {
        DailyStat {
            date: date.to_string(),
            towns,
            nations: 10,
            residents: 100,
            online: 5,
        }
    }

    #[test]
    fn record_keeps_first_snapshot_of_the_day() {
        let mut doc = HistoryDoc::default();
        assert!(doc.record(stat("2026-02-10", 3000), "2026-02-10T06:00:00Z"));
        assert!(!doc.record(stat("2026-02-10", 3050), "2026-02-10T12:00:00Z"));

        assert_eq!(doc.stats.len(), 1);
        assert_eq!(doc.stats[0].towns, 3000);
        assert_eq!(doc.last_updated, "2026-02-10T06:00:00Z");
    }

    #[test]
    fn record_keeps_dates_sorted() {
        let mut doc = HistoryDoc::default();
        doc.record(stat("2026-02-11", 1), "2026-02-11T06:00:00Z");
        doc.record(stat("2026-02-09", 2), "2026-02-11T06:01:00Z");
        doc.record(stat("2026-02-10", 3), "2026-02-11T06:02:00Z");

        let dates: Vec<&str> = doc.stats.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-09", "2026-02-10", "2026-02-11"]);
    }

    #[test]
    fn merge_unions_disjoint_dates() {
        let mut local = HistoryDoc {
            last_updated: "2026-02-10T06:00:00Z".to_string(),
            stats: vec![stat("2026-02-10", 3000)],
        };
        let remote = HistoryDoc {
            last_updated: "2026-02-09T06:00:00Z".to_string(),
            stats: vec![stat("2026-02-09", 2990)],
        };

        local.merge(remote);
        assert_eq!(local.stats.len(), 2);
        assert_eq!(local.stats[0].date, "2026-02-09");
        assert_eq!(local.last_updated, "2026-02-10T06:00:00Z");
    }

    #[test]
    fn merge_collision_prefers_newer_document() {
        let mut stale = HistoryDoc {
            last_updated: "2026-02-10T06:00:00Z".to_string(),
            stats: vec![stat("2026-02-10", 1)],
        };
        let fresh = HistoryDoc {
            last_updated: "2026-02-10T18:00:00Z".to_string(),
            stats: vec![stat("2026-02-10", 2)],
        };

        stale.merge(fresh);
        assert_eq!(stale.stats.len(), 1);
        assert_eq!(stale.stats[0].towns, 2);
        assert_eq!(stale.last_updated, "2026-02-10T18:00:00Z");
    }

    #[test]
    fn merge_collision_keeps_own_entry_when_newer() {
        let mut fresh = HistoryDoc {
            last_updated: "2026-02-10T18:00:00Z".to_string(),
            stats: vec![stat("2026-02-10", 2)],
        };
        let stale = HistoryDoc {
            last_updated: "2026-02-10T06:00:00Z".to_string(),
            stats: vec![stat("2026-02-10", 1), stat("2026-02-08", 9)],
        };

        fresh.merge(stale);
        assert_eq!(fresh.stats.len(), 2);
        assert_eq!(fresh.entry("2026-02-10").unwrap().towns, 2);
        assert_eq!(fresh.entry("2026-02-08").unwrap().towns, 9);
    }

    #[test]
    fn trim_drops_entries_outside_window() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 11).unwrap();
        let mut doc = HistoryDoc::default();
        doc.record(stat("2026-01-01", 1), "t1");
        doc.record(stat("2026-02-05", 2), "t2");
        doc.record(stat("2026-02-11", 3), "t3");
        doc.record(stat("not-a-date", 4), "t4");

        doc.trim(7, today);
        let dates: Vec<&str> = doc.stats.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-05", "2026-02-11"]);
    }

    #[test]
    fn document_round_trips_with_camel_case_key() {
        let doc = HistoryDoc {
            last_updated: "2026-02-10T06:00:00Z".to_string(),
            stats: vec![stat("2026-02-10", 3000)],
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"lastUpdated\""));

        let parsed: HistoryDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
