//! Синтетические данные кампаний для тестов

use crate::extract::read_csv_from;
use crate::types::CampaignTable;

const HEADER: &str = "Campaign_ID,Company,Campaign_Type,Target_Audience,Duration,Channel_Used,\
Conversion_Rate,Acquisition_Cost,ROI,Location,Language,Clicks,Impressions,Engagement_Score,Customer_Segment";

const AUDIENCES: [&str; 5] = ["Men 18-24", "Women 25-34", "Men 35-44", "All Ages", "Women 18-24"];
const CHANNELS: [&str; 4] = ["Email", "Website", "Google Ads", "YouTube"];
const LOCATIONS: [&str; 3] = ["Chicago", "New York", "Miami"];
const TYPES: [&str; 3] = ["Email", "Influencer", "Search"];
const SEGMENTS: [&str; 2] = ["Foodies", "Tech Enthusiasts"];

/// CSV в формате исходного датасета. ROI и Engagement_Score растут вместе,
/// поэтому около 30% строк успешны.
pub fn campaign_csv(rows: usize) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..rows {
        let level = (i * 7) % 10;
        csv.push_str(&format!(
            "{id},Acme,{kind},{audience},{days}days,{channel},{conversion:.2},\"${thousands},{units:03}.{cents:02}\",{roi:.1},{location},English,{clicks},{impressions},{engagement:.1},{segment}\n",
            id = i + 1,
            kind = TYPES[i % 3],
            audience = AUDIENCES[i % 5],
            days = 15 + (i % 4) * 15,
            channel = CHANNELS[i % 4],
            conversion = 0.01 * (i % 10) as f64,
            thousands = 1 + i % 9,
            units = (i * 37) % 1000,
            cents = i % 100,
            roi = level as f64 + 0.5,
            location = LOCATIONS[i % 3],
            clicks = 100 + (i * 7) % 50,
            impressions = 1000 + (i * 13) % 500,
            engagement = level as f64 + 0.5 + ((i / 10) % 2) as f64 * 0.2,
            segment = SEGMENTS[i % 2],
        ));
    }
    csv
}

pub fn campaign_table(rows: usize) -> CampaignTable {
    read_csv_from(campaign_csv(rows).as_bytes()).expect("synthetic CSV parses")
}
