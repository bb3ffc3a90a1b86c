//! Fixed lookup tables for the name normalizer.
//!
//! Plain static slices; [`crate::normalize`] builds its hash lookups from these
//! once per process.

use crate::keys::PartyKey;

// ── Canonical districts ──

/// The 77 canonical district names with their province.
pub const CANONICAL_DISTRICTS: &[(&str, &str)] = &[
    // Koshi
    ("Taplejung", "Koshi"),
    ("Panchthar", "Koshi"),
    ("Ilam", "Koshi"),
    ("Jhapa", "Koshi"),
    ("Morang", "Koshi"),
    ("Sunsari", "Koshi"),
    ("Dhankuta", "Koshi"),
    ("Terhathum", "Koshi"),
    ("Sankhuwasabha", "Koshi"),
    ("Bhojpur", "Koshi"),
    ("Solukhumbu", "Koshi"),
    ("Okhaldhunga", "Koshi"),
    ("Khotang", "Koshi"),
    ("Udayapur", "Koshi"),
    // Madhesh
    ("Saptari", "Madhesh"),
    ("Siraha", "Madhesh"),
    ("Dhanusha", "Madhesh"),
    ("Mahottari", "Madhesh"),
    ("Sarlahi", "Madhesh"),
    ("Rautahat", "Madhesh"),
    ("Bara", "Madhesh"),
    ("Parsa", "Madhesh"),
    // Bagmati
    ("Dolakha", "Bagmati"),
    ("Sindhupalchok", "Bagmati"),
    ("Rasuwa", "Bagmati"),
    ("Dhading", "Bagmati"),
    ("Nuwakot", "Bagmati"),
    ("Kathmandu", "Bagmati"),
    ("Bhaktapur", "Bagmati"),
    ("Lalitpur", "Bagmati"),
    ("Kavrepalanchok", "Bagmati"),
    ("Ramechhap", "Bagmati"),
    ("Sindhuli", "Bagmati"),
    ("Makwanpur", "Bagmati"),
    ("Chitwan", "Bagmati"),
    // Gandaki
    ("Gorkha", "Gandaki"),
    ("Manang", "Gandaki"),
    ("Mustang", "Gandaki"),
    ("Myagdi", "Gandaki"),
    ("Kaski", "Gandaki"),
    ("Lamjung", "Gandaki"),
    ("Tanahun", "Gandaki"),
    ("Nawalpur", "Gandaki"),
    ("Syangja", "Gandaki"),
    ("Parbat", "Gandaki"),
    ("Baglung", "Gandaki"),
    // Lumbini
    ("Eastern Rukum", "Lumbini"),
    ("Rolpa", "Lumbini"),
    ("Pyuthan", "Lumbini"),
    ("Gulmi", "Lumbini"),
    ("Arghakhanchi", "Lumbini"),
    ("Palpa", "Lumbini"),
    ("Parasi", "Lumbini"),
    ("Rupandehi", "Lumbini"),
    ("Kapilvastu", "Lumbini"),
    ("Dang", "Lumbini"),
    ("Banke", "Lumbini"),
    ("Bardiya", "Lumbini"),
    // Karnali
    ("Western Rukum", "Karnali"),
    ("Salyan", "Karnali"),
    ("Dolpa", "Karnali"),
    ("Humla", "Karnali"),
    ("Jumla", "Karnali"),
    ("Kalikot", "Karnali"),
    ("Mugu", "Karnali"),
    ("Surkhet", "Karnali"),
    ("Dailekh", "Karnali"),
    ("Jajarkot", "Karnali"),
    // Sudurpashchim
    ("Bajura", "Sudurpashchim"),
    ("Bajhang", "Sudurpashchim"),
    ("Achham", "Sudurpashchim"),
    ("Doti", "Sudurpashchim"),
    ("Kailali", "Sudurpashchim"),
    ("Kanchanpur", "Sudurpashchim"),
    ("Dadeldhura", "Sudurpashchim"),
    ("Baitadi", "Sudurpashchim"),
    ("Darchula", "Sudurpashchim"),
];

// ── Native-script district names ──

/// Devanagari district names (including common alternate spellings) as
/// they appear in the results feed, after whitespace and dash cleanup.
pub const NATIVE_DISTRICTS: &[(&str, &str)] = &[
    ("ताप्लेजुङ", "Taplejung"),
    ("पाँचथर", "Panchthar"),
    ("पांचथर", "Panchthar"),
    ("इलाम", "Ilam"),
    ("झापा", "Jhapa"),
    ("मोरङ", "Morang"),
    ("सुनसरी", "Sunsari"),
    ("धनकुटा", "Dhankuta"),
    ("तेह्रथुम", "Terhathum"),
    ("तेर्हथुम", "Terhathum"),
    ("संखुवासभा", "Sankhuwasabha"),
    ("भोजपुर", "Bhojpur"),
    ("सोलुखुम्बु", "Solukhumbu"),
    ("ओखलढुङ्गा", "Okhaldhunga"),
    ("ओखलढुंगा", "Okhaldhunga"),
    ("खोटाङ", "Khotang"),
    ("उदयपुर", "Udayapur"),
    ("सप्तरी", "Saptari"),
    ("सिरहा", "Siraha"),
    ("धनुषा", "Dhanusha"),
    ("धनुसा", "Dhanusha"),
    ("महोत्तरी", "Mahottari"),
    ("सर्लाही", "Sarlahi"),
    ("रौतहट", "Rautahat"),
    ("बारा", "Bara"),
    ("पर्सा", "Parsa"),
    ("दोलखा", "Dolakha"),
    ("सिन्धुपाल्चोक", "Sindhupalchok"),
    ("सिन्धुपाल्चाेक", "Sindhupalchok"),
    ("रसुवा", "Rasuwa"),
    ("धादिङ", "Dhading"),
    ("नुवाकोट", "Nuwakot"),
    ("काठमाडौं", "Kathmandu"),
    ("काठमाडौँ", "Kathmandu"),
    ("काठमाण्डौ", "Kathmandu"),
    ("भक्तपुर", "Bhaktapur"),
    ("ललितपुर", "Lalitpur"),
    ("काभ्रेपलाञ्चोक", "Kavrepalanchok"),
    ("काभ्रे", "Kavrepalanchok"),
    ("रामेछाप", "Ramechhap"),
    ("सिन्धुली", "Sindhuli"),
    ("मकवानपुर", "Makwanpur"),
    ("चितवन", "Chitwan"),
    ("गोरखा", "Gorkha"),
    ("मनाङ", "Manang"),
    ("मुस्ताङ", "Mustang"),
    ("म्याग्दी", "Myagdi"),
    ("कास्की", "Kaski"),
    ("लमजुङ", "Lamjung"),
    ("तनहुँ", "Tanahun"),
    ("तनहुं", "Tanahun"),
    ("नवलपुर", "Nawalpur"),
    ("नवलपरासी (बर्दघाट सुस्ता पूर्व)", "Nawalpur"),
    ("स्याङ्जा", "Syangja"),
    ("स्याङजा", "Syangja"),
    ("पर्वत", "Parbat"),
    ("बागलुङ", "Baglung"),
    ("रुकुम (पूर्वी भाग)", "Eastern Rukum"),
    ("रुकुम पूर्व", "Eastern Rukum"),
    ("पूर्वी रुकुम", "Eastern Rukum"),
    ("रोल्पा", "Rolpa"),
    ("प्यूठान", "Pyuthan"),
    ("प्युठान", "Pyuthan"),
    ("गुल्मी", "Gulmi"),
    ("अर्घाखाँची", "Arghakhanchi"),
    ("अर्घाखांची", "Arghakhanchi"),
    ("पाल्पा", "Palpa"),
    ("परासी", "Parasi"),
    ("नवलपरासी (बर्दघाट सुस्ता पश्चिम)", "Parasi"),
    ("रुपन्देही", "Rupandehi"),
    ("रूपन्देही", "Rupandehi"),
    ("कपिलवस्तु", "Kapilvastu"),
    ("कपिलबस्तु", "Kapilvastu"),
    ("दाङ", "Dang"),
    ("बाँके", "Banke"),
    ("बांके", "Banke"),
    ("बर्दिया", "Bardiya"),
    ("रुकुम (पश्चिम भाग)", "Western Rukum"),
    ("रुकुम पश्चिम", "Western Rukum"),
    ("पश्चिमी रुकुम", "Western Rukum"),
    ("सल्यान", "Salyan"),
    ("डोल्पा", "Dolpa"),
    ("हुम्ला", "Humla"),
    ("जुम्ला", "Jumla"),
    ("कालिकोट", "Kalikot"),
    ("मुगु", "Mugu"),
    ("सुर्खेत", "Surkhet"),
    ("दैलेख", "Dailekh"),
    ("जाजरकोट", "Jajarkot"),
    ("बाजुरा", "Bajura"),
    ("बझाङ", "Bajhang"),
    ("अछाम", "Achham"),
    ("डोटी", "Doti"),
    ("कैलाली", "Kailali"),
    ("कञ्चनपुर", "Kanchanpur"),
    ("कंचनपुर", "Kanchanpur"),
    ("डडेल्धुरा", "Dadeldhura"),
    ("डडेलधुरा", "Dadeldhura"),
    ("बैतडी", "Baitadi"),
    ("दार्चुला", "Darchula"),
];

// ── Alias overrides ──

/// Spelling mismatches between the encyclopedia table, the boundary file,
/// and the canonical names. Keys are lowercase; matched case-insensitively
/// after the native-script lookup.
pub const DISTRICT_ALIASES: &[(&str, &str)] = &[
    // The old Nawalparasi and Rukum districts were split in two; each half
    // shows up under several names.
    ("nawalparasi east", "Nawalpur"),
    ("nawalparasi (east)", "Nawalpur"),
    ("nawalparasi (bardaghat susta east)", "Nawalpur"),
    ("nawalparasi bardaghat susta east", "Nawalpur"),
    ("nawalparasi west", "Parasi"),
    ("nawalparasi (west)", "Parasi"),
    ("nawalparasi (bardaghat susta west)", "Parasi"),
    ("nawalparasi bardaghat susta west", "Parasi"),
    ("rukum east", "Eastern Rukum"),
    ("rukum (east)", "Eastern Rukum"),
    ("east rukum", "Eastern Rukum"),
    ("rukum west", "Western Rukum"),
    ("rukum (west)", "Western Rukum"),
    ("west rukum", "Western Rukum"),
    // Misspellings and transliteration drift.
    ("kavre", "Kavrepalanchok"),
    ("kabhrepalanchok", "Kavrepalanchok"),
    ("sindhupalchowk", "Sindhupalchok"),
    ("tanahu", "Tanahun"),
    ("makawanpur", "Makwanpur"),
    ("chitawan", "Chitwan"),
    ("dhanusa", "Dhanusha"),
    ("kapilbastu", "Kapilvastu"),
    ("tehrathum", "Terhathum"),
    ("udaypur", "Udayapur"),
    ("okhaldunga", "Okhaldhunga"),
    ("mahotari", "Mahottari"),
    ("bardia", "Bardiya"),
];

// ── Party rules ──

/// One substring rule of the party normalizer.
pub struct PartyRule {
    pub party: PartyKey,
    /// Devanagari literals.
    pub native: &'static [&'static str],
    /// Lowercase Latin-script substrings.
    pub latin: &'static [&'static str],
}

impl PartyRule {
    /// Test against already-lowercased input.
    pub fn matches(&self, lowered: &str) -> bool {
        self.native.iter().any(|n| lowered.contains(n))
            || self.latin.iter().any(|l| lowered.contains(l))
    }
}

/// Party rules in priority order; first match wins, no match means
/// [`PartyKey::Others`].
///
/// Order:
/// 1. UML before the communist bucket: its full name contains "communist".
/// 2. Maoist/communist bucket: catches every other communist-lineage party
///    (Maoist Centre, Unified Socialist, ...).
/// 3. Congress.
/// 4. RSP, then RPP: both start with "Rastriya", so each rule keys on the
///    word that follows it.
/// 5. JSP, then LSP: both are "... Samajwadi", so each rule keys on the
///    qualifying word in front of it.
/// 6. Janamat.
///
/// A bare "स्वतन्त्र" (independent candidate) must not hit RSP, so that rule
/// needs the full party phrase.
pub const PARTY_RULES: &[PartyRule] = &[
    PartyRule {
        party: PartyKey::Uml,
        native: &["एमाले", "एकीकृत मार्क्सवादी लेनिनवादी", "एकीकृत मार्क्सवादी-लेनिनवादी"],
        latin: &["uml", "unified marxist"],
    },
    PartyRule {
        party: PartyKey::Maoist,
        native: &["माओवादी", "कम्युनिष्ट", "कम्युनिस्ट", "नेकपा"],
        latin: &["maoist", "communist", "cpn"],
    },
    PartyRule {
        party: PartyKey::Congress,
        native: &["कांग्रेस", "काँग्रेस", "कंग्रेस"],
        latin: &["congress"],
    },
    PartyRule {
        party: PartyKey::Rsp,
        native: &["राष्ट्रिय स्वतन्त्र", "स्वतन्त्र पार्टी"],
        latin: &["swatantra", "rsp"],
    },
    PartyRule {
        party: PartyKey::Rpp,
        native: &["राष्ट्रिय प्रजातन्त्र", "प्रजातन्त्र पार्टी"],
        latin: &["prajatantra", "rpp"],
    },
    PartyRule {
        party: PartyKey::Jsp,
        native: &["जनता समाजवादी"],
        latin: &["janata samajbadi", "janata samajwadi", "jsp"],
    },
    PartyRule {
        party: PartyKey::Lsp,
        native: &["लोकतान्त्रिक समाजवादी"],
        latin: &["loktantrik samajbadi", "loktantrik samajwadi", "lsp"],
    },
    PartyRule {
        party: PartyKey::Janamat,
        native: &["जनमत"],
        latin: &["janamat"],
    },
];
