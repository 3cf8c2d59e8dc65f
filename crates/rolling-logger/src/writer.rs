//! Size-rotating log file writer
//!
//! `{stem}.log` is always the live file; on rotation it becomes `{stem}.1.log`,
//! older files shift up by one and anything past `max_files` is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::buffer::LineBuffer;

pub struct RollingFileWriter {
    dir: PathBuf,
    stem: String,
    max_bytes: u64,
    max_files: usize,
    file: Option<File>,
    written: u64,
    partial: Vec<u8>,
    buffer: LineBuffer,
}

impl RollingFileWriter {
    pub fn open(
        dir: &Path,
        stem: &str,
        max_bytes: u64,
        max_files: usize,
        buffer_lines: usize,
    ) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut writer = Self {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
            max_bytes,
            max_files: max_files.max(1),
            file: None,
            written: 0,
            partial: Vec::new(),
            buffer: LineBuffer::new(buffer_lines),
        };
        writer.open_live()?;
        Ok(writer)
    }

    pub fn live_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.stem))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}.log", self.stem, index))
    }

    pub fn recent_lines(&self) -> Vec<String> {
        self.buffer.snapshot()
    }

    fn open_live(&mut self) -> io::Result<()> {
        let path = self.live_path();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        let keep = self.max_files - 1;
        if keep == 0 {
            fs::remove_file(self.live_path()).or_else(ignore_missing)?;
            return self.open_live();
        }

        fs::remove_file(self.rotated_path(keep)).or_else(ignore_missing)?;
        for index in (1..keep).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        fs::rename(self.live_path(), self.rotated_path(1)).or_else(ignore_missing)?;
        self.open_live()
    }

    fn collect_lines(&mut self, bytes: &[u8]) {
        self.partial.extend_from_slice(bytes);
        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            self.buffer.push(text);
        }
    }
}

fn ignore_missing(err: io::Error) -> io::Result<()> {
    if err.kind() == io::ErrorKind::NotFound {
        Ok(())
    } else {
        Err(err)
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        if self.file.is_none() {
            self.open_live()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        file.write_all(buf)?;
        self.written += buf.len() as u64;
        self.collect_lines(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}
