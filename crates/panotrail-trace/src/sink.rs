use std::io::Write;

use crate::{Result, Snapshot};

pub trait TraceSink {
    fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let line = snapshot.to_record().encode_line()?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl TraceSink for Vec<Snapshot> {
    fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.push(snapshot.clone());
        Ok(())
    }
}
