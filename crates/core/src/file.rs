//! Text file handle
//!
//! `TextFile` owns one binary stream at a time. Reads resolve the encoding
//! from the byte order mark before touching content and hand back the raw
//! post-BOM bytes; writes emit the BOM only at the start of an empty stream.

use crate::encoding::{detect_bom, Encoding, Utf8Policy, UTF8_SNIFF_LIMIT};
use crate::error::TextFileError;
use crate::Result;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How a [`TextFile`] stream is opened. Streams are always binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read an existing file
    Read,
    /// Create or truncate, then write
    Write,
    /// Create if missing, then append
    Append,
}

impl OpenMode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            OpenMode::Read => {
                options.read(true);
            }
            OpenMode::Write => {
                options.write(true).create(true).truncate(true);
            }
            OpenMode::Append => {
                options.append(true).create(true);
            }
        }
        options
    }

    fn is_writable(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::Append)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// Fixed-width storage unit of a read or write buffer
pub trait CodeUnit: sealed::Sealed + Copy + Default {
    /// Width in bytes
    const WIDTH: usize;

    /// Append the little-endian bytes of `units` to `out`
    fn extend_bytes(units: &[Self], out: &mut Vec<u8>);

    /// Decode little-endian `bytes` into `out`; a short final unit is zero-padded
    fn fill_from_bytes(bytes: &[u8], out: &mut [Self]);
}

impl CodeUnit for u8 {
    const WIDTH: usize = 1;

    fn extend_bytes(units: &[Self], out: &mut Vec<u8>) {
        out.extend_from_slice(units);
    }

    fn fill_from_bytes(bytes: &[u8], out: &mut [Self]) {
        out[..bytes.len()].copy_from_slice(bytes);
    }
}

impl CodeUnit for u16 {
    const WIDTH: usize = 2;

    fn extend_bytes(units: &[Self], out: &mut Vec<u8>) {
        out.reserve(units.len() * 2);
        for unit in units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }

    fn fill_from_bytes(bytes: &[u8], out: &mut [Self]) {
        for (slot, chunk) in out.iter_mut().zip(bytes.chunks(2)) {
            *slot = u16::from_le_bytes([chunk[0], chunk.get(1).copied().unwrap_or(0)]);
        }
    }
}

/// Number of `T` units needed to hold `bytes` bytes (odd trailing byte rounds up)
fn units_for<T: CodeUnit>(bytes: usize) -> usize {
    bytes / T::WIDTH + usize::from(bytes % T::WIDTH != 0)
}

/// An encoding-aware handle on a single text file.
///
/// The handle is not `Clone`: exactly one stream is owned at a time. It can
/// be reopened after [`TextFile::close`], and dropping it closes the stream.
#[derive(Debug)]
pub struct TextFile {
    path: PathBuf,
    encoding: Encoding,
    utf8_policy: Utf8Policy,
    mode: Option<OpenMode>,
    file: Option<File>,
}

impl TextFile {
    /// Create a closed handle for `path` with the `System` encoding
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_encoding(path, Encoding::System)
    }

    /// Create a closed handle with an explicit encoding for writing
    pub fn with_encoding(path: impl Into<PathBuf>, encoding: Encoding) -> Self {
        Self {
            path: path.into(),
            encoding: encoding.normalized(),
            utf8_policy: Utf8Policy::default(),
            mode: None,
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point the handle at another file. Only allowed while closed.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        if self.file.is_some() {
            return Err(TextFileError::AlreadyOpen(self.path.clone()));
        }
        self.path = path.into();
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn mode(&self) -> Option<OpenMode> {
        self.mode
    }

    /// Current encoding (never `Unknown`)
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Set the encoding used by subsequent writes; `Unknown` becomes `System`
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding.normalized();
    }

    pub fn utf8_policy(&self) -> Utf8Policy {
        self.utf8_policy
    }

    pub fn set_utf8_policy(&mut self, policy: Utf8Policy) {
        self.utf8_policy = policy;
    }

    /// Open the binary stream.
    ///
    /// Fails without changing any state if the path is empty, the handle is
    /// already open, or the OS refuses the open.
    pub fn open(&mut self, mode: OpenMode) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(TextFileError::EmptyPath);
        }
        if self.file.is_some() {
            return Err(TextFileError::AlreadyOpen(self.path.clone()));
        }

        let file = mode.options().open(&self.path)?;
        debug!(path = %self.path.display(), ?mode, "Opened text file");
        self.file = Some(file);
        self.mode = Some(mode);
        Ok(())
    }

    /// Open and return a guard that closes the handle when dropped
    pub fn session(&mut self, mode: OpenMode) -> Result<TextSession<'_>> {
        self.open(mode)?;
        Ok(TextSession { file: self })
    }

    /// Release the stream. Calling this on a closed handle is a no-op.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            debug!(path = %self.path.display(), "Closed text file");
        }
        self.mode = None;
    }

    /// Length of the open stream in bytes
    pub fn stream_len(&self) -> Result<u64> {
        Ok(self.stream()?.metadata()?.len())
    }

    /// Current stream position in bytes
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.stream_mut()?.stream_position()?)
    }

    /// Detect the byte order mark at the start of the stream.
    ///
    /// Leaves the stream just after the BOM, or at the start when there is none.
    pub fn read_bom(&mut self) -> Result<Encoding> {
        let file = self.readable_stream()?;
        file.seek(SeekFrom::Start(0))?;
        Ok(detect_bom(file)?)
    }

    /// Resolve and store the encoding of the file.
    ///
    /// BOM-less content is classified by the handle's [`Utf8Policy`]. The
    /// stream is left just after any BOM.
    pub fn update_encoding_from_bom(&mut self) -> Result<Encoding> {
        let policy = self.utf8_policy;
        let mut encoding = self.read_bom()?;

        if encoding == Encoding::System && policy == Utf8Policy::Detect {
            let file = self.stream_mut()?;
            let start = file.stream_position()?;
            // Room for the tail of a sequence that starts inside the window
            let mut sample = Vec::with_capacity(UTF8_SNIFF_LIMIT + 3);
            Read::by_ref(file)
                .take(UTF8_SNIFF_LIMIT as u64 + 3)
                .read_to_end(&mut sample)?;
            file.seek(SeekFrom::Start(start))?;
            encoding = policy.classify(&sample);
        }

        self.encoding = encoding;
        Ok(encoding)
    }

    /// Read the whole post-BOM content into `buf`.
    ///
    /// The encoding is resolved first. `u16` buffers are only accepted for
    /// UTF-16LE content. When `buf` is too short and `resizable` is false the
    /// read fails with [`TextFileError::BufferTooSmall`]; a resizable buffer
    /// is sized to fit exactly. Returns the number of code units read.
    pub fn read_into<T: CodeUnit>(&mut self, buf: &mut Vec<T>, resizable: bool) -> Result<usize> {
        let encoding = self.update_encoding_from_bom()?;
        if T::WIDTH != 1 && T::WIDTH != encoding.code_unit_width() {
            return Err(TextFileError::UnsupportedWidth {
                width: T::WIDTH,
                encoding,
            });
        }

        let file = self.stream_mut()?;
        let bom_len = file.stream_position()?;
        let content_len = file.metadata()?.len().saturating_sub(bom_len) as usize;
        let required = units_for::<T>(content_len);

        if buf.len() < required && !resizable {
            return Err(TextFileError::BufferTooSmall {
                required,
                capacity: buf.len(),
            });
        }

        let mut bytes = Vec::with_capacity(content_len);
        Read::by_ref(file)
            .take(content_len as u64)
            .read_to_end(&mut bytes)?;

        let units = units_for::<T>(bytes.len());
        if resizable {
            buf.clear();
            buf.resize(units, T::default());
        }
        T::fill_from_bytes(&bytes, &mut buf[..units]);
        Ok(units)
    }

    /// Read the post-BOM content as raw bytes
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_into(&mut buf, true)?;
        Ok(buf)
    }

    /// Read UTF-16LE content as code units
    pub fn read_all_u16(&mut self) -> Result<Vec<u16>> {
        let mut buf = Vec::new();
        self.read_into(&mut buf, true)?;
        Ok(buf)
    }

    /// Write the BOM of the current encoding at the start of the stream.
    ///
    /// In append mode the BOM is only written when the stream is empty.
    /// Returns the number of bytes written.
    pub fn write_bom(&mut self) -> Result<usize> {
        let mode = self.writable_mode()?;
        let bom = self.encoding.bom();
        let file = self.stream_mut()?;

        if mode == OpenMode::Append && file.metadata()?.len() != 0 {
            return Ok(0);
        }
        file.seek(SeekFrom::Start(0))?;
        file.write_all(bom)?;
        Ok(bom.len())
    }

    /// Replace the file's content.
    ///
    /// In write mode the stream is truncated and the BOM (if any) is written
    /// before the payload. In append mode the BOM is only written when the
    /// stream is empty.
    pub fn write_all<T: CodeUnit>(&mut self, units: &[T]) -> Result<()> {
        let mode = self.writable_mode()?;
        self.check_width::<T>()?;
        let encoding = self.encoding;
        let file = self.stream_mut()?;

        let mut bytes = Vec::with_capacity(encoding.bom().len() + units.len() * T::WIDTH);
        match mode {
            OpenMode::Append => {
                if file.metadata()?.len() == 0 {
                    bytes.extend_from_slice(encoding.bom());
                }
            }
            _ => {
                file.set_len(0)?;
                file.seek(SeekFrom::Start(0))?;
                bytes.extend_from_slice(encoding.bom());
            }
        }
        T::extend_bytes(units, &mut bytes);
        file.write_all(&bytes)?;
        Ok(())
    }

    /// Append `units`, preceded by the BOM when this is the first write to an empty stream
    pub fn write_some<T: CodeUnit>(&mut self, units: &[T]) -> Result<()> {
        self.writable_mode()?;
        self.check_width::<T>()?;
        let bom = self.encoding.bom();
        let file = self.stream_mut()?;

        let mut bytes = Vec::with_capacity(bom.len() + units.len() * T::WIDTH);
        if file.metadata()?.len() == 0 {
            bytes.extend_from_slice(bom);
        }
        T::extend_bytes(units, &mut bytes);
        file.write_all(&bytes)?;
        Ok(())
    }

    /// [`TextFile::write_some`] followed by the encoding's CR LF sequence
    pub fn write_line<T: CodeUnit>(&mut self, units: &[T]) -> Result<()> {
        self.write_some(units)?;
        let newline = self.encoding.newline();
        self.stream_mut()?.write_all(newline)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stream_mut()?.flush()?;
        Ok(())
    }

    fn stream(&self) -> Result<&File> {
        self.file.as_ref().ok_or(TextFileError::NotOpen)
    }

    fn stream_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(TextFileError::NotOpen)
    }

    fn readable_stream(&mut self) -> Result<&mut File> {
        match self.mode {
            None => Err(TextFileError::NotOpen),
            Some(OpenMode::Read) => self.stream_mut(),
            Some(_) => Err(TextFileError::NotReadable),
        }
    }

    fn writable_mode(&self) -> Result<OpenMode> {
        match self.mode {
            None => Err(TextFileError::NotOpen),
            Some(mode) if mode.is_writable() => Ok(mode),
            Some(_) => Err(TextFileError::NotWritable),
        }
    }

    fn check_width<T: CodeUnit>(&self) -> Result<()> {
        if T::WIDTH != 1 && T::WIDTH != self.encoding.code_unit_width() {
            return Err(TextFileError::UnsupportedWidth {
                width: T::WIDTH,
                encoding: self.encoding,
            });
        }
        Ok(())
    }
}

/// Open [`TextFile`] that is closed again when the guard is dropped
#[derive(Debug)]
pub struct TextSession<'a> {
    file: &'a mut TextFile,
}

impl Deref for TextSession<'_> {
    type Target = TextFile;

    fn deref(&self) -> &TextFile {
        self.file
    }
}

impl DerefMut for TextSession<'_> {
    fn deref_mut(&mut self) -> &mut TextFile {
        self.file
    }
}

impl Drop for TextSession<'_> {
    fn drop(&mut self) {
        self.file.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf16(text: &str) -> Vec<u16> {
        text.encode_utf16().collect()
    }

    #[test]
    fn test_open_rejects_empty_path() {
        let mut file = TextFile::new("");
        assert!(matches!(file.open(OpenMode::Read), Err(TextFileError::EmptyPath)));
        assert!(!file.is_open());
    }

    #[test]
    fn test_open_twice_fails_without_state_change() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"abc").unwrap();

        let mut file = TextFile::new(&path);
        file.open(OpenMode::Read).unwrap();
        assert!(matches!(
            file.open(OpenMode::Write),
            Err(TextFileError::AlreadyOpen(_))
        ));
        assert_eq!(file.mode(), Some(OpenMode::Read));
        assert_eq!(file.read_all().unwrap(), b"abc");
    }

    #[test]
    fn test_open_missing_file_for_read() {
        let temp_dir = TempDir::new().unwrap();
        let mut file = TextFile::new(temp_dir.path().join("missing.txt"));
        let err = file.open(OpenMode::Read).unwrap_err();
        assert!(matches!(err, TextFileError::Io(_)));
        assert!(!file.is_open());
        assert_eq!(file.mode(), None);
    }

    #[test]
    fn test_close_is_idempotent_and_reopenable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.txt");

        let mut file = TextFile::new(&path);
        file.close();
        file.open(OpenMode::Write).unwrap();
        file.write_all(b"one").unwrap();
        file.close();
        file.close();
        assert!(!file.is_open());

        file.open(OpenMode::Read).unwrap();
        assert_eq!(file.read_all().unwrap(), b"one");
    }

    #[test]
    fn test_set_path_only_while_closed() {
        let temp_dir = TempDir::new().unwrap();
        let mut file = TextFile::new(temp_dir.path().join("a.txt"));
        file.open(OpenMode::Write).unwrap();
        assert!(file.set_path(temp_dir.path().join("b.txt")).is_err());
        file.close();
        file.set_path(temp_dir.path().join("b.txt")).unwrap();
        assert!(file.path().ends_with("b.txt"));
    }

    #[test]
    fn test_unknown_normalizes_to_system() {
        let mut file = TextFile::with_encoding("x.txt", Encoding::Unknown);
        assert_eq!(file.encoding(), Encoding::System);
        file.set_encoding(Encoding::Utf8);
        file.set_encoding(Encoding::Unknown);
        assert_eq!(file.encoding(), Encoding::System);
    }

    #[test]
    fn test_mode_violations() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file.txt");

        let mut file = TextFile::new(&path);
        assert!(matches!(file.read_bom(), Err(TextFileError::NotOpen)));
        assert!(matches!(file.write_all(b"x"), Err(TextFileError::NotOpen)));

        file.open(OpenMode::Write).unwrap();
        assert!(matches!(file.read_bom(), Err(TextFileError::NotReadable)));
        assert!(matches!(file.read_all(), Err(TextFileError::NotReadable)));
        file.close();

        file.open(OpenMode::Read).unwrap();
        assert!(matches!(file.write_all(b"x"), Err(TextFileError::NotWritable)));
        assert!(matches!(file.write_line(b"x"), Err(TextFileError::NotWritable)));
        assert!(matches!(file.write_bom(), Err(TextFileError::NotWritable)));
    }

    #[test]
    fn test_utf8_roundtrip_with_bom() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        let text = "héllo, 세계";

        let mut file = TextFile::with_encoding(&path, Encoding::Utf8);
        file.open(OpenMode::Write).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.close();

        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[..3], &[0xEF, 0xBB, 0xBF]);

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        let bytes = reader.read_all().unwrap();
        assert_eq!(reader.encoding(), Encoding::Utf8);
        assert_eq!(String::from_utf8(bytes).unwrap(), text);
    }

    #[test]
    fn test_utf16le_roundtrip_with_bom() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        let text = "hi 안녕";

        let mut file = TextFile::with_encoding(&path, Encoding::Utf16Le);
        file.open(OpenMode::Write).unwrap();
        file.write_all(&utf16(text)).unwrap();
        file.close();

        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[..4], &[0xFF, 0xFE, b'h', 0x00]);

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        let units = reader.read_all_u16().unwrap();
        assert_eq!(reader.encoding(), Encoding::Utf16Le);
        assert_eq!(String::from_utf16(&units).unwrap(), text);
    }

    #[test]
    fn test_system_roundtrip_has_no_bom() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");

        let mut file = TextFile::new(&path);
        file.open(OpenMode::Write).unwrap();
        file.write_all(b"plain text").unwrap();
        file.close();

        assert_eq!(fs::read(&path).unwrap(), b"plain text");

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.read_all().unwrap(), b"plain text");
        assert_eq!(reader.encoding(), Encoding::System);
    }

    #[test]
    fn test_system_high_bytes_stay_system() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        // "café" in windows-1252
        fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.read_all().unwrap(), [b'c', b'a', b'f', 0xE9]);
        assert_eq!(reader.encoding(), Encoding::System);
    }

    #[test]
    fn test_utf8_without_bom_detection_policy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, "naïve".as_bytes()).unwrap();

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.update_encoding_from_bom().unwrap(), Encoding::Utf8NoBom);
        assert_eq!(reader.position().unwrap(), 0);
        assert_eq!(reader.read_all().unwrap(), "naïve".as_bytes());
        reader.close();

        reader.set_utf8_policy(Utf8Policy::Ignore);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.update_encoding_from_bom().unwrap(), Encoding::System);
    }

    #[test]
    fn test_sniff_ignores_bytes_past_limit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");

        // Valid UTF-8 prefix with a multi-byte sequence straddling the limit,
        // followed by garbage that must not be inspected
        let mut content = "é".as_bytes().to_vec();
        content.resize(UTF8_SNIFF_LIMIT - 1, b'a');
        content.extend_from_slice("é".as_bytes());
        content.extend_from_slice(&[0xFF; 16]);
        fs::write(&path, &content).unwrap();

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.update_encoding_from_bom().unwrap(), Encoding::Utf8NoBom);
    }

    #[test]
    fn test_sniff_checks_sequence_tail_past_limit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");

        // Three-byte lead inside the window, broken continuation two bytes past it
        let mut content = vec![b'a'; UTF8_SNIFF_LIMIT - 1];
        content.extend_from_slice(&[0xE2, 0x82, b'A']);
        fs::write(&path, &content).unwrap();

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.update_encoding_from_bom().unwrap(), Encoding::System);
        assert_eq!(reader.position().unwrap(), 0);
    }

    #[test]
    fn test_update_encoding_positions_after_bom() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, [0xEF, 0xBB, 0xBF, b'x']).unwrap();

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.update_encoding_from_bom().unwrap(), Encoding::Utf8);
        assert_eq!(reader.position().unwrap(), 3);
    }

    #[test]
    fn test_empty_and_one_byte_files() {
        let temp_dir = TempDir::new().unwrap();
        let empty = temp_dir.path().join("empty.txt");
        let one = temp_dir.path().join("one.txt");
        fs::write(&empty, b"").unwrap();
        fs::write(&one, [0xFF]).unwrap();

        let mut reader = TextFile::new(&empty);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.read_bom().unwrap(), Encoding::System);
        assert!(reader.read_all().unwrap().is_empty());
        reader.close();

        reader.set_path(&one).unwrap();
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.read_bom().unwrap(), Encoding::System);
        assert_eq!(reader.read_all().unwrap(), [0xFF]);
    }

    #[test]
    fn test_buffer_too_small_when_not_resizable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"0123456789").unwrap();

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();

        let mut small = vec![0u8; 4];
        match reader.read_into(&mut small, false) {
            Err(TextFileError::BufferTooSmall { required, capacity }) => {
                assert_eq!(required, 10);
                assert_eq!(capacity, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let mut exact = vec![0u8; 16];
        assert_eq!(reader.read_into(&mut exact, false).unwrap(), 10);
        assert_eq!(&exact[..10], b"0123456789");
        assert_eq!(exact.len(), 16);
    }

    #[test]
    fn test_odd_utf16_byte_count_rounds_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, [0xFF, 0xFE, 0x41, 0x00, 0x42]).unwrap();

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        assert_eq!(reader.read_all_u16().unwrap(), vec![0x0041, 0x0042]);
    }

    #[test]
    fn test_wide_buffer_rejected_for_8bit_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"ascii").unwrap();

        let mut reader = TextFile::new(&path);
        reader.open(OpenMode::Read).unwrap();
        assert!(matches!(
            reader.read_all_u16(),
            Err(TextFileError::UnsupportedWidth { width: 2, .. })
        ));

        let mut writer = TextFile::new(temp_dir.path().join("out.txt"));
        writer.open(OpenMode::Write).unwrap();
        assert!(matches!(
            writer.write_all(&[0x41u16]),
            Err(TextFileError::UnsupportedWidth { .. })
        ));
    }

    #[test]
    fn test_write_all_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.txt");

        let mut file = TextFile::with_encoding(&path, Encoding::Utf8);
        file.open(OpenMode::Write).unwrap();
        file.write_all(b"first version").unwrap();
        file.write_all(b"second").unwrap();
        file.close();

        assert_eq!(fs::read(&path).unwrap(), b"\xEF\xBB\xBFsecond");
    }

    #[test]
    fn test_append_never_reemits_bom() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.txt");

        let mut file = TextFile::with_encoding(&path, Encoding::Utf8);
        file.open(OpenMode::Append).unwrap();
        file.write_some(b"a").unwrap();
        file.write_some(b"b").unwrap();
        file.close();

        file.open(OpenMode::Append).unwrap();
        file.write_some(b"c").unwrap();
        file.write_all(b"d").unwrap();
        assert_eq!(file.write_bom().unwrap(), 0);
        file.close();

        assert_eq!(fs::read(&path).unwrap(), b"\xEF\xBB\xBFabcd");
    }

    #[test]
    fn test_write_line_newlines() {
        let temp_dir = TempDir::new().unwrap();
        let narrow = temp_dir.path().join("narrow.txt");
        let wide = temp_dir.path().join("wide.txt");

        let mut file = TextFile::new(&narrow);
        file.open(OpenMode::Write).unwrap();
        file.write_line(b"one").unwrap();
        file.write_line(b"two").unwrap();
        file.close();
        assert_eq!(fs::read(&narrow).unwrap(), b"one\r\ntwo\r\n");

        let mut file = TextFile::with_encoding(&wide, Encoding::Utf16Le);
        file.open(OpenMode::Write).unwrap();
        file.write_line(&utf16("A")).unwrap();
        file.close();
        assert_eq!(
            fs::read(&wide).unwrap(),
            vec![0xFF, 0xFE, 0x41, 0x00, 0x0D, 0x00, 0x0A, 0x00]
        );
    }

    #[test]
    fn test_write_bom_then_some() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.txt");

        let mut file = TextFile::with_encoding(&path, Encoding::Utf16Le);
        file.open(OpenMode::Write).unwrap();
        assert_eq!(file.write_bom().unwrap(), 2);
        file.write_some(&utf16("z")).unwrap();
        file.close();

        assert_eq!(fs::read(&path).unwrap(), vec![0xFF, 0xFE, b'z', 0x00]);
    }

    #[test]
    fn test_session_closes_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.txt");

        let mut file = TextFile::new(&path);
        {
            let mut session = file.session(OpenMode::Write).unwrap();
            session.write_all(b"scoped").unwrap();
            assert!(session.is_open());
        }
        assert!(!file.is_open());
        assert_eq!(fs::read(&path).unwrap(), b"scoped");
    }

    #[test]
    fn test_stream_len() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"12345").unwrap();

        let mut file = TextFile::new(&path);
        assert!(file.stream_len().is_err());
        file.open(OpenMode::Read).unwrap();
        assert_eq!(file.stream_len().unwrap(), 5);
    }
}
