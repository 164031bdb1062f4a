use std::io::{Read, Seek, SeekFrom, Write};

use combiner_core::error::CombinerError;
use combiner_core::io::sink::{DirectorySink, MemorySink, OutputSink, SinkCapability};

// ---------------------------------------------------------------------------
// DirectorySink
// ---------------------------------------------------------------------------

#[test]
fn test_directory_sink_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path(), Some("Combined"));
    assert_eq!(sink.directory(), dir.path().join("Combined"));

    let pending = sink.create_pending("median_image_1.jpg", "image/jpeg").unwrap();
    assert_eq!(pending.capability, SinkCapability::RandomAccess);
    sink.write(&pending, b"abc").unwrap();
    sink.write(&pending, b"def").unwrap();

    let target = dir.path().join("Combined").join("median_image_1.jpg");
    assert!(!target.exists(), "pending resource must not be visible");
    assert_eq!(sink.read_back(&pending).unwrap(), b"abcdef");

    let id = sink.finalize(pending).unwrap();
    assert_eq!(id.0, target.display().to_string());
    assert_eq!(std::fs::read(&target).unwrap(), b"abcdef");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("Combined"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn test_directory_sink_without_subfolder() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path(), Some(""));
    assert_eq!(sink.directory(), dir.path());

    let pending = sink.create_pending("a.png", "image/png").unwrap();
    sink.write(&pending, b"png").unwrap();
    sink.finalize(pending).unwrap();
    assert!(dir.path().join("a.png").exists());
}

#[test]
fn test_directory_sink_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("modal_image_1.jpg"), b"existing").unwrap();

    let mut sink = DirectorySink::new(dir.path(), None);
    let pending = sink.create_pending("modal_image_1.jpg", "image/jpeg").unwrap();
    sink.write(&pending, b"new").unwrap();

    let err = sink.finalize(pending.clone()).unwrap_err();
    assert!(matches!(err, CombinerError::OutputSink(_)));
    assert_eq!(
        std::fs::read(dir.path().join("modal_image_1.jpg")).unwrap(),
        b"existing"
    );

    sink.delete_pending(pending).unwrap();
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["modal_image_1.jpg".to_string()]);
}

#[test]
fn test_directory_sink_delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path(), None);
    let pending = sink.create_pending("x.jpg", "image/jpeg").unwrap();

    sink.delete_pending(pending.clone()).unwrap();
    sink.delete_pending(pending).unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_directory_sink_random_access() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path(), None);
    let pending = sink.create_pending("r.jpg", "image/jpeg").unwrap();
    sink.write(&pending, b"0123456789").unwrap();

    {
        let mut handle = sink.open_random_access(&pending).unwrap();
        let mut head = [0u8; 4];
        handle.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"0123");
        handle.seek(SeekFrom::Start(2)).unwrap();
        handle.write_all(b"ab").unwrap();
        handle.truncate(6).unwrap();
    }

    assert_eq!(sink.read_back(&pending).unwrap(), b"01ab45");
}

#[test]
fn test_write_once_sink_has_no_random_access() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path(), None).with_capability(SinkCapability::WriteOnce);
    let pending = sink.create_pending("w.jpg", "image/jpeg").unwrap();
    assert_eq!(pending.capability, SinkCapability::WriteOnce);
    assert!(sink.open_random_access(&pending).is_err());

    sink.write(&pending, b"first").unwrap();
    sink.overwrite(&pending, b"second").unwrap();
    assert_eq!(sink.read_back(&pending).unwrap(), b"second");
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

#[test]
fn test_memory_sink_lifecycle() {
    let mut sink = MemorySink::new(SinkCapability::RandomAccess);
    let kept = sink.create_pending("kept.png", "image/png").unwrap();
    let dropped = sink.create_pending("dropped.png", "image/png").unwrap();
    assert_ne!(kept.key, dropped.key);

    sink.write(&kept, b"pixels").unwrap();
    sink.write(&dropped, b"partial").unwrap();
    assert!(sink.finalized().is_empty());
    assert_eq!(sink.pending_count(), 2);

    sink.finalize(kept).unwrap();
    sink.delete_pending(dropped).unwrap();

    let finalized = sink.finalized();
    assert_eq!(finalized.len(), 1);
    assert_eq!(finalized["kept.png"].bytes, b"pixels");
    assert_eq!(finalized["kept.png"].mime_type, "image/png");
    assert_eq!(sink.pending_count(), 0);
}

#[test]
fn test_memory_sink_rejects_finalized_resource() {
    let mut sink = MemorySink::new(SinkCapability::WriteOnce);
    let pending = sink.create_pending("a.jpg", "image/jpeg").unwrap();
    sink.finalize(pending.clone()).unwrap();

    assert!(sink.write(&pending, b"late").is_err());
    assert!(sink.open_random_access(&pending).is_err());
}

#[test]
fn test_memory_sink_random_access() {
    let mut sink = MemorySink::new(SinkCapability::RandomAccess);
    let pending = sink.create_pending("m.jpg", "image/jpeg").unwrap();
    sink.write(&pending, b"abcdef").unwrap();

    {
        let mut handle = sink.open_random_access(&pending).unwrap();
        handle.seek(SeekFrom::End(-2)).unwrap();
        handle.write_all(b"XYZ").unwrap();
        handle.truncate(5).unwrap();
    }

    assert_eq!(sink.read_back(&pending).unwrap(), b"abcdX");
}
