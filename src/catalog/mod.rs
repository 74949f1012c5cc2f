mod queries;

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension};
use tracing::info;

use crate::error::Result;

/// A freshly ingested media row, as landed in the staging table.
#[derive(Debug, Clone)]
pub struct StagingRecord {
    pub audio_id: String,
    pub raw_file_name: String,
    pub duration: f64,
    pub cleaned_duration: f64,
    pub title: String,
    pub num_of_speakers: i64,
    pub language: String,
    pub has_other_audio_signature: bool,
    pub media_type: String,
    pub source: String,
    pub source_url: String,
    pub source_website: String,
    pub utterances_files_list: Vec<String>,
    pub recorded_state: String,
    pub recorded_district: String,
    pub recorded_place: String,
    pub recorded_date: String,
    pub purpose: String,
    pub speaker_name: String,
    pub speaker_gender: String,
    pub mother_tongue: String,
    pub age_group: String,
    pub load_datetime: DateTime<Utc>,
}

impl Default for StagingRecord {
    fn default() -> Self {
        Self {
            audio_id: String::new(),
            raw_file_name: String::new(),
            duration: 0.0,
            cleaned_duration: 0.0,
            title: String::new(),
            num_of_speakers: 0,
            language: String::new(),
            has_other_audio_signature: false,
            media_type: "audio".to_string(),
            source: String::new(),
            source_url: String::new(),
            source_website: String::new(),
            utterances_files_list: Vec::new(),
            recorded_state: String::new(),
            recorded_district: String::new(),
            recorded_place: String::new(),
            recorded_date: String::new(),
            purpose: String::new(),
            speaker_name: String::new(),
            speaker_gender: String::new(),
            mother_tongue: String::new(),
            age_group: String::new(),
            load_datetime: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Metadata catalog: staging, permanent media, speaker, and mapping tables.
///
/// Migration steps are incremental on the `load_datetime` watermark, append
/// only, and never mutate staging. Database errors propagate unmodified.
pub struct Catalog {
    conn: Arc<Mutex<Connection>>,
}

impl Catalog {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let catalog = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS media_metadata_staging (
                audio_id TEXT NOT NULL,
                raw_file_name TEXT,
                duration REAL,
                cleaned_duration REAL,
                title TEXT,
                num_of_speakers INTEGER,
                language TEXT,
                has_other_audio_signature INTEGER,
                type TEXT,
                source TEXT,
                source_url TEXT,
                source_website TEXT,
                utterances_files_list TEXT,
                recorded_state TEXT,
                recorded_district TEXT,
                recorded_place TEXT,
                recorded_date TEXT,
                purpose TEXT,
                speaker_name TEXT,
                speaker_gender TEXT,
                mother_tongue TEXT,
                age_group TEXT,
                load_datetime TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS media (
                audio_id TEXT NOT NULL,
                raw_file_name TEXT,
                total_duration REAL,
                title TEXT,
                cleaned_duration REAL,
                num_of_speakers INTEGER,
                language TEXT,
                has_other_audio_signature INTEGER,
                type TEXT,
                source TEXT,
                source_url TEXT,
                source_website TEXT,
                utterances_files_list TEXT,
                recorded_state TEXT,
                recorded_district TEXT,
                recorded_place TEXT,
                recorded_date TEXT,
                purpose TEXT,
                load_datetime TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS speaker (
                speaker_id INTEGER PRIMARY KEY AUTOINCREMENT,
                speaker_name TEXT NOT NULL,
                source TEXT,
                gender TEXT,
                mother_tongue TEXT,
                age_group TEXT,
                load_datetime TEXT
            );

            CREATE TABLE IF NOT EXISTS media_speaker_mapping (
                audio_id TEXT NOT NULL,
                speaker_id INTEGER NOT NULL,
                load_datetime TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_staging_load
                ON media_metadata_staging(load_datetime);
            CREATE INDEX IF NOT EXISTS idx_media_load ON media(load_datetime);
            CREATE INDEX IF NOT EXISTS idx_speaker_name ON speaker(speaker_name);
            "#,
        )?;
        Ok(())
    }

    /// Latest `load_datetime` already present in `media`, if any.
    pub fn media_watermark(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock().unwrap();
        let watermark = conn.query_row(queries::MEDIA_WATERMARK, [], |row| row.get(0))?;
        Ok(watermark)
    }

    /// Latest `load_datetime` already present in `media_speaker_mapping`.
    pub fn mapping_watermark(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock().unwrap();
        let watermark = conn.query_row(queries::MAPPING_WATERMARK, [], |row| row.get(0))?;
        Ok(watermark)
    }

    /// Copy staging rows newer than the watermark into `media`.
    ///
    /// Returns the number of rows copied. A `None` watermark copies
    /// everything.
    pub fn migrate_new_media(&self, watermark: Option<DateTime<Utc>>) -> Result<usize> {
        let max_datetime = watermark.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let conn = self.conn.lock().unwrap();
        let copied = conn.execute(
            queries::INSERT_NEW_MEDIA,
            named_params! { ":max_datetime": max_datetime },
        )?;
        info!("Copied {} staged media rows", copied);
        Ok(copied)
    }

    /// Insert one speaker per staged name with no existing speaker row.
    ///
    /// Returns the number of speakers inserted. Existing speaker rows are
    /// never updated.
    pub fn dedupe_speakers(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(queries::INSERT_UNIQUE_SPEAKERS, [])?;
        info!("Inserted {} new speakers", inserted);
        Ok(inserted)
    }

    pub fn speaker_id_for_audio(&self, audio_id: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                queries::SPEAKER_ID_FOR_AUDIO,
                named_params! { ":audio_id": audio_id },
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn load_time_for_audio(&self, audio_id: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock().unwrap();
        let load_time = conn
            .query_row(
                queries::LOAD_TIME_FOR_AUDIO,
                named_params! { ":audio_id": audio_id },
                |row| row.get(0),
            )
            .optional()?;
        Ok(load_time)
    }

    /// Audio ids in `media` newer than the mapping watermark.
    pub fn list_new_audio_ids(&self, watermark: Option<DateTime<Utc>>) -> Result<Vec<String>> {
        let max_load_date = watermark.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(queries::NEW_AUDIO_IDS)?;
        let ids = stmt
            .query_map(named_params! { ":max_load_date": max_load_date }, |row| {
                row.get(0)
            })?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Land a freshly ingested row in the staging table.
    pub fn stage_media(&self, record: &StagingRecord) -> Result<()> {
        let utterances = serde_json::to_string(&record.utterances_files_list)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            queries::STAGE_MEDIA,
            params![
                record.audio_id,
                record.raw_file_name,
                record.duration,
                record.cleaned_duration,
                record.title,
                record.num_of_speakers,
                record.language,
                record.has_other_audio_signature,
                record.media_type,
                record.source,
                record.source_url,
                record.source_website,
                utterances,
                record.recorded_state,
                record.recorded_district,
                record.recorded_place,
                record.recorded_date,
                record.purpose,
                record.speaker_name,
                record.speaker_gender,
                record.mother_tongue,
                record.age_group,
                record.load_datetime,
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn staged(audio_id: &str, speaker: &str, load: DateTime<Utc>) -> StagingRecord {
        StagingRecord {
            audio_id: audio_id.to_string(),
            raw_file_name: format!("{audio_id}.mp3"),
            duration: 120.0,
            title: format!("title {audio_id}"),
            source: "src1".to_string(),
            speaker_name: speaker.to_string(),
            speaker_gender: "female".to_string(),
            load_datetime: load,
            ..Default::default()
        }
    }

    #[test]
    fn test_watermark_none_when_media_empty() {
        let catalog = Catalog::open_in_memory().unwrap();
        assert!(catalog.media_watermark().unwrap().is_none());
        assert!(catalog.mapping_watermark().unwrap().is_none());
    }

    #[test]
    fn test_migrate_copies_only_rows_newer_than_watermark() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.stage_media(&staged("A2", "ravi", ts(200))).unwrap();

        let copied = catalog.migrate_new_media(Some(ts(100))).unwrap();
        assert_eq!(copied, 1);

        assert_eq!(catalog.load_time_for_audio("A1").unwrap(), None);
        assert_eq!(catalog.load_time_for_audio("A2").unwrap(), Some(ts(200)));
        assert_eq!(catalog.media_watermark().unwrap(), Some(ts(200)));
    }

    #[test]
    fn test_migrate_with_no_watermark_copies_everything() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.stage_media(&staged("A2", "ravi", ts(200))).unwrap();

        let copied = catalog.migrate_new_media(None).unwrap();
        assert_eq!(copied, 2);
    }

    #[test]
    fn test_migrate_never_recopies_at_watermark() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();

        assert_eq!(catalog.migrate_new_media(None).unwrap(), 1);
        let watermark = catalog.media_watermark().unwrap();
        assert_eq!(catalog.migrate_new_media(watermark).unwrap(), 0);
    }

    #[test]
    fn test_dedupe_inserts_one_speaker_per_name() {
        let catalog = Catalog::open_in_memory().unwrap();
        let mut first = staged("A1", "asha", ts(100));
        first.speaker_gender = "female".to_string();
        let mut second = staged("A2", "asha", ts(200));
        second.speaker_gender = "f".to_string();
        catalog.stage_media(&first).unwrap();
        catalog.stage_media(&second).unwrap();

        assert_eq!(catalog.dedupe_speakers().unwrap(), 1);
        // Second run sees the existing speaker and inserts nothing
        assert_eq!(catalog.dedupe_speakers().unwrap(), 0);
    }

    #[test]
    fn test_dedupe_aggregates_by_minimum() {
        let catalog = Catalog::open_in_memory().unwrap();
        let mut first = staged("A1", "asha", ts(200));
        first.speaker_gender = "female".to_string();
        let mut second = staged("A2", "asha", ts(100));
        second.speaker_gender = "f".to_string();
        catalog.stage_media(&first).unwrap();
        catalog.stage_media(&second).unwrap();

        catalog.dedupe_speakers().unwrap();

        let conn = catalog.conn.lock().unwrap();
        let (gender, load): (String, DateTime<Utc>) = conn
            .query_row(
                "SELECT gender, load_datetime FROM speaker WHERE speaker_name = 'asha'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(gender, "f");
        assert_eq!(load, ts(100));
    }

    #[test]
    fn test_speaker_lookup_joins_staging() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.dedupe_speakers().unwrap();

        assert!(catalog.speaker_id_for_audio("A1").unwrap().is_some());
        assert!(catalog.speaker_id_for_audio("A9").unwrap().is_none());
    }

    #[test]
    fn test_list_new_audio_ids() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.stage_media(&staged("A2", "ravi", ts(200))).unwrap();
        catalog.migrate_new_media(None).unwrap();

        let mut all = catalog.list_new_audio_ids(None).unwrap();
        all.sort();
        assert_eq!(all, vec!["A1".to_string(), "A2".to_string()]);

        let newer = catalog.list_new_audio_ids(Some(ts(100))).unwrap();
        assert_eq!(newer, vec!["A2".to_string()]);
    }
}
