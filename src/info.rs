use crate::refs::{ObjectReferences, RefType};
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use pdf_writer::{Date as PDate, Pdf, TextStr};

/// General document metatdata such as title, subject, producer, etc
#[derive(Default, Debug, Clone)]
pub struct Info {
    /// The title of the document.
    pub title: Option<String>,
    /// The author(s) of the document. No prescribed format.
    pub author: Option<String>,
    /// The subject of the document.
    pub subject: Option<String>,
    /// Keywords for the document. No prescribed format, though Adobe Acrobat suggests
    /// using a comma separated list of keywords
    pub keywords: Option<String>,
    /// The application that created the original content
    pub creator: Option<String>,
    /// The application that converted the content to PDF
    pub producer: Option<String>,
    /// When the document was created. Defaults to the moment of writing.
    pub creation_date: Option<DateTime<FixedOffset>>,
}

impl Info {
    /// Create a new info block, with all metadata set to [None]
    pub fn new() -> Info {
        Info::default()
    }

    /// Set the title of the info block, modifying `self`
    pub fn title<S: ToString>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.to_string());
        self
    }

    /// Set the author of the info block, modifying `self`
    pub fn author<S: ToString>(&mut self, author: S) -> &mut Self {
        self.author = Some(author.to_string());
        self
    }

    /// Set the subject of the info block, modifying `self`
    pub fn subject<S: ToString>(&mut self, subject: S) -> &mut Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the keywords of the info block, modifying `self`
    pub fn keywords<S: ToString>(&mut self, keywords: S) -> &mut Self {
        self.keywords = Some(keywords.to_string());
        self
    }

    /// Set the creator of the info block, modifying `self`
    pub fn creator<S: ToString>(&mut self, creator: S) -> &mut Self {
        self.creator = Some(creator.to_string());
        self
    }

    /// Set the producer of the info block, modifying `self`
    pub fn producer<S: ToString>(&mut self, producer: S) -> &mut Self {
        self.producer = Some(producer.to_string());
        self
    }

    /// Pin the creation date instead of using the time of writing
    pub fn creation_date(&mut self, date: DateTime<FixedOffset>) -> &mut Self {
        self.creation_date = Some(date);
        self
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let id = refs.gen(RefType::Info);
        let mut info = writer.document_info(id);

        if let Some(title) = &self.title {
            info.title(TextStr(title.as_str()));
        }
        if let Some(author) = &self.author {
            info.author(TextStr(author.as_str()));
        }
        if let Some(subject) = &self.subject {
            info.subject(TextStr(subject.as_str()));
        }
        if let Some(keywords) = &self.keywords {
            info.keywords(TextStr(keywords.as_str()));
        }
        match &self.creator {
            Some(creator) => info.creator(TextStr(creator.as_str())),
            None => info.creator(TextStr(concat!(
                env!("CARGO_PKG_NAME"),
                " v",
                env!("CARGO_PKG_VERSION")
            ))),
        };
        if let Some(producer) = &self.producer {
            info.producer(TextStr(producer.as_str()));
        }

        let now = self
            .creation_date
            .unwrap_or_else(|| chrono::Local::now().fixed_offset());
        info.creation_date(pdf_date(&now));
    }
}

fn pdf_date(when: &DateTime<FixedOffset>) -> PDate {
    let offset = when.offset().local_minus_utc();
    let offset_hours = offset / (60 * 60);
    let offset_minutes = ((offset - (offset_hours * (60 * 60))) / 60).abs();
    PDate::new(when.year() as u16)
        .month(when.month() as u8)
        .day(when.day() as u8)
        .hour(when.hour() as u8)
        .minute(when.minute() as u8)
        .second(when.second() as u8)
        .utc_offset_hour(offset_hours as i8)
        .utc_offset_minute(offset_minutes as u8)
}
