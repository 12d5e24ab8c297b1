// Integration tests for audio buffers, capture sources and the archive
//
// These tests verify WAV encoding, file replay and that recordings are
// written to disk in the expected format.

mod common;

use anyhow::Result;
use common::pcm;
use ptt_assistant::audio::{AudioBuffer, AudioFormat, AudioSource, RecordingArchive, SilenceSource, WavFileSource};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn write_wav(path: &Path, spec: hound::WavSpec, samples: &[i16]) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, spec)?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

fn mono_16k() -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

#[test]
fn test_buffer_duration() {
    let format = AudioFormat::new(16000, 1);
    let mut buffer = AudioBuffer::new(format);
    assert!(buffer.is_empty());

    buffer.append(&pcm(0.5, format));
    assert!((buffer.duration_secs() - 0.5).abs() < 1e-9);

    let stereo = AudioFormat::new(16000, 2);
    let buffer = AudioBuffer::from_bytes(vec![0u8; 64000], stereo);
    assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
}

#[test]
fn test_buffer_clear() {
    let mut buffer = AudioBuffer::new(AudioFormat::default());
    buffer.append(&[1, 2, 3, 4]);
    buffer.clear();

    assert!(buffer.is_empty());
    assert_eq!(buffer.duration_secs(), 0.0);
}

#[test]
fn test_buffer_to_wav_round_trips_samples() -> Result<()> {
    let samples: Vec<i16> = vec![0, 1, -1, i16::MAX, i16::MIN, 1234];
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    let buffer = AudioBuffer::from_bytes(bytes, AudioFormat::default());

    let wav = buffer.to_wav()?;
    let reader = hound::WavReader::new(Cursor::new(wav))?;

    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().bits_per_sample, 16);
    let decoded: Vec<i16> = reader.into_samples::<i16>().collect::<std::result::Result<_, _>>()?;
    assert_eq!(decoded, samples);

    Ok(())
}

#[test]
fn test_silence_source_frame_size() -> Result<()> {
    let mut source = SilenceSource::unpaced(AudioFormat::new(16000, 2));

    let frame = source.read_frame(100)?;
    assert_eq!(frame.len(), 400, "100 frames * 2 channels * 2 bytes");
    assert!(frame.iter().all(|b| *b == 0));
    assert_eq!(source.name(), "silence");

    Ok(())
}

#[test]
fn test_wav_source_replays_and_loops() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("input.wav");
    let samples: Vec<i16> = (0..10).collect();
    write_wav(&path, mono_16k(), &samples)?;

    let mut source = WavFileSource::open(&path)?.unpaced();
    assert_eq!(source.format(), AudioFormat::new(16000, 1));
    assert!(source.path().ends_with("input.wav"));

    let first = source.read_frame(6)?;
    let second = source.read_frame(6)?;
    let decode = |bytes: &[u8]| -> Vec<i16> {
        bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    };

    assert_eq!(decode(&first), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(decode(&second), vec![6, 7, 8, 9, 0, 1], "wraps to the start");

    source.reset()?;
    assert_eq!(decode(&source.read_frame(2)?), vec![0, 1]);

    Ok(())
}

#[test]
fn test_wav_source_rejects_float_samples() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("float.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec)?;
    writer.write_sample(0.5f32)?;
    writer.finalize()?;

    assert!(WavFileSource::open(&path).is_err());

    Ok(())
}

#[test]
fn test_wav_source_rejects_empty_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("empty.wav");
    write_wav(&path, mono_16k(), &[])?;

    assert!(WavFileSource::open(&path).is_err());
    assert!(WavFileSource::open(temp_dir.path().join("missing.wav")).is_err());

    Ok(())
}

#[test]
fn test_archive_writes_wav_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = RecordingArchive::new(temp_dir.path().join("nested").join("archive"))?;
    assert!(archive.dir().exists(), "archive directory is created");

    let format = AudioFormat::default();
    let buffer = AudioBuffer::from_bytes(pcm(0.5, format), format);

    let first = archive.save(&buffer)?;
    let second = archive.save(&buffer)?;
    assert_ne!(first, second, "each recording gets its own file");

    let reader = hound::WavReader::open(&first)?;
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.len(), 8000, "0.5s at 16 kHz mono");

    let name = first
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    assert!(name.starts_with("recording_") && name.ends_with(".wav"));

    Ok(())
}
