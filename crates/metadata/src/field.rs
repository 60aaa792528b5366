use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A descriptive field of `ComicInfo.xml`, each stored as a direct child
/// element of the document root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Series,
    Number,
    Count,
    Volume,
    AlternateSeries,
    AlternateNumber,
    StoryArc,
    SeriesGroup,
    AlternateCount,
    Summary,
    Notes,
    Year,
    Month,
    Day,
    Writer,
    Penciller,
    Inker,
    Colorist,
    Letterer,
    CoverArtist,
    Editor,
    Publisher,
    Imprint,
    Genre,
    Web,
    PageCount,
    LanguageIso,
    Format,
    AgeRating,
    BlackAndWhite,
    Manga,
    Characters,
    Teams,
    Locations,
    ScanInformation,
}

impl Field {
    /// Every field, in schema order.
    pub const ALL: [Field; 36] = [
        Field::Title,
        Field::Series,
        Field::Number,
        Field::Count,
        Field::Volume,
        Field::AlternateSeries,
        Field::AlternateNumber,
        Field::StoryArc,
        Field::SeriesGroup,
        Field::AlternateCount,
        Field::Summary,
        Field::Notes,
        Field::Year,
        Field::Month,
        Field::Day,
        Field::Writer,
        Field::Penciller,
        Field::Inker,
        Field::Colorist,
        Field::Letterer,
        Field::CoverArtist,
        Field::Editor,
        Field::Publisher,
        Field::Imprint,
        Field::Genre,
        Field::Web,
        Field::PageCount,
        Field::LanguageIso,
        Field::Format,
        Field::AgeRating,
        Field::BlackAndWhite,
        Field::Manga,
        Field::Characters,
        Field::Teams,
        Field::Locations,
        Field::ScanInformation,
    ];

    /// The XML element name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Series => "Series",
            Field::Number => "Number",
            Field::Count => "Count",
            Field::Volume => "Volume",
            Field::AlternateSeries => "AlternateSeries",
            Field::AlternateNumber => "AlternateNumber",
            Field::StoryArc => "StoryArc",
            Field::SeriesGroup => "SeriesGroup",
            Field::AlternateCount => "AlternateCount",
            Field::Summary => "Summary",
            Field::Notes => "Notes",
            Field::Year => "Year",
            Field::Month => "Month",
            Field::Day => "Day",
            Field::Writer => "Writer",
            Field::Penciller => "Penciller",
            Field::Inker => "Inker",
            Field::Colorist => "Colorist",
            Field::Letterer => "Letterer",
            Field::CoverArtist => "CoverArtist",
            Field::Editor => "Editor",
            Field::Publisher => "Publisher",
            Field::Imprint => "Imprint",
            Field::Genre => "Genre",
            Field::Web => "Web",
            Field::PageCount => "PageCount",
            Field::LanguageIso => "LanguageISO",
            Field::Format => "Format",
            Field::AgeRating => "AgeRating",
            Field::BlackAndWhite => "BlackAndWhite",
            Field::Manga => "Manga",
            Field::Characters => "Characters",
            Field::Teams => "Teams",
            Field::Locations => "Locations",
            Field::ScanInformation => "ScanInformation",
        }
    }

    /// The field stored under exactly this element name.
    pub(crate) fn from_element(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl FromStr for Field {
    type Err = Error;
    /// Accepts the element name (`StoryArc`) or its snake case form
    /// (`story_arc`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| *c != '_' && *c != '-').collect();
        match Self::ALL.into_iter().find(|field| field.as_str().eq_ignore_ascii_case(&wanted)) {
            Some(field) => Ok(field),
            None => exn::bail!(ErrorKind::UnknownField(s.to_string())),
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Field {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
