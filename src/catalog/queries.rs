//! Parameterized statements for the metadata migration steps.

pub(crate) const MEDIA_WATERMARK: &str = "SELECT MAX(load_datetime) FROM media;";

pub(crate) const MAPPING_WATERMARK: &str = "SELECT MAX(load_datetime) FROM media_speaker_mapping;";

/// Incremental copy from staging into media. The staging `duration` column
/// feeds `media.total_duration`; everything else is column-for-column.
pub(crate) const INSERT_NEW_MEDIA: &str = "\
    INSERT INTO media(audio_id, raw_file_name, total_duration, title, cleaned_duration, \
        num_of_speakers, language, has_other_audio_signature, type, source, source_url, \
        source_website, utterances_files_list, recorded_state, recorded_district, \
        recorded_place, recorded_date, purpose, load_datetime) \
    SELECT audio_id, raw_file_name, duration, title, cleaned_duration, \
        num_of_speakers, language, has_other_audio_signature, type, source, source_url, \
        source_website, utterances_files_list, recorded_state, recorded_district, \
        recorded_place, recorded_date, purpose, load_datetime \
    FROM media_metadata_staging WHERE load_datetime > :max_datetime;";

/// One new speaker per staged name with no existing speaker row, attributes
/// aggregated by minimum when the name occurs more than once in staging.
pub(crate) const INSERT_UNIQUE_SPEAKERS: &str = "\
    INSERT INTO speaker(speaker_name, source, gender, mother_tongue, age_group, load_datetime) \
    SELECT t.speaker_name, t.source, MIN(t.speaker_gender), MIN(t.mother_tongue), \
        MIN(t.age_group), MIN(t.load_datetime) \
    FROM media_metadata_staging t \
    LEFT JOIN speaker ts ON ts.speaker_name = t.speaker_name \
    WHERE ts.speaker_name IS NULL \
    GROUP BY t.speaker_name, t.source;";

pub(crate) const SPEAKER_ID_FOR_AUDIO: &str = "\
    SELECT s.speaker_id FROM speaker s \
    JOIN media_metadata_staging b ON s.speaker_name = b.speaker_name \
    WHERE b.audio_id = :audio_id;";

pub(crate) const LOAD_TIME_FOR_AUDIO: &str =
    "SELECT load_datetime FROM media WHERE audio_id = :audio_id;";

pub(crate) const NEW_AUDIO_IDS: &str =
    "SELECT media.audio_id FROM media WHERE load_datetime > :max_load_date;";

pub(crate) const STAGE_MEDIA: &str = "\
    INSERT INTO media_metadata_staging(audio_id, raw_file_name, duration, cleaned_duration, \
        title, num_of_speakers, language, has_other_audio_signature, type, source, source_url, \
        source_website, utterances_files_list, recorded_state, recorded_district, \
        recorded_place, recorded_date, purpose, speaker_name, speaker_gender, mother_tongue, \
        age_group, load_datetime) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, \
        ?19, ?20, ?21, ?22, ?23);";
