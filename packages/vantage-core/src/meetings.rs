//! Committee meeting schedule.
//!
//! Pulls the date-ranged committee-meeting XML, keeps the committees
//! the office cares about, and attaches each kept meeting's agenda
//! items. A meeting whose agenda fetch fails still appears, just with
//! an empty agenda.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::ScanResult;
use crate::fetch::RelayFetcher;

/// One bill on a meeting agenda.
#[derive(Debug, Clone)]
pub struct AgendaItem {
    pub bill_id: String,
    pub description: String,
}

/// One upcoming committee meeting.
#[derive(Debug, Clone)]
pub struct CommitteeMeeting {
    pub agenda_id: String,
    pub committee: String,
    pub agency: String,
    pub date: Option<NaiveDateTime>,
    pub bills: Vec<AgendaItem>,
}

/// Client for the committee-meeting web service.
pub struct MeetingsClient {
    fetcher: Arc<RelayFetcher>,
    base_url: String,
    committees: Vec<String>,
}

impl MeetingsClient {
    pub fn new(fetcher: Arc<RelayFetcher>, config: &PipelineConfig) -> Self {
        Self {
            fetcher,
            base_url: config.legis_service_url.clone(),
            committees: config.committee_names.clone(),
        }
    }

    /// Meetings of the configured committees between `begin` and `end`,
    /// sorted by date, each with its agenda attached.
    pub async fn upcoming(
        &self,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> ScanResult<Vec<CommitteeMeeting>> {
        let url = format!(
            "{}/GetCommitteeMeetings?beginDate={}&endDate={}",
            self.base_url, begin, end
        );
        let xml = self.fetcher.get_text(&url).await?;

        let mut meetings: Vec<CommitteeMeeting> = parse_meetings(&xml)
            .into_iter()
            .filter(|m| self.committees.iter().any(|name| m.committee.contains(name)))
            .collect();

        for meeting in &mut meetings {
            if meeting.agenda_id.is_empty() {
                continue;
            }
            match self.agenda_items(&meeting.agenda_id).await {
                Ok(items) => meeting.bills = items,
                Err(e) => {
                    warn!(agenda_id = %meeting.agenda_id, error = %e, "agenda fetch failed");
                }
            }
        }

        meetings.sort_by_key(|m| m.date);
        info!(count = meetings.len(), "meeting schedule fetched");
        Ok(meetings)
    }

    async fn agenda_items(&self, agenda_id: &str) -> ScanResult<Vec<AgendaItem>> {
        let url = format!(
            "{}/GetCommitteeMeetingItems?agendaId={}",
            self.base_url, agenda_id
        );
        let xml = self.fetcher.get_text(&url).await?;
        Ok(parse_agenda(&xml))
    }
}

/// Parse `CommitteeMeeting` blocks out of the schedule payload.
fn parse_meetings(xml: &str) -> Vec<CommitteeMeeting> {
    let mut reader = Reader::from_str(xml);
    let mut meetings = Vec::new();
    let mut current: Option<CommitteeMeeting> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "CommitteeMeeting" {
                    current = Some(CommitteeMeeting {
                        agenda_id: String::new(),
                        committee: String::new(),
                        agency: String::new(),
                        date: None,
                        bills: Vec::new(),
                    });
                } else if current.is_some() {
                    field = Some(name);
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(meeting), Some(tag)) = (current.as_mut(), field.as_deref()) {
                    let text = t.unescape().unwrap_or_default().trim().to_string();
                    if text.is_empty() {
                        continue;
                    }
                    match tag {
                        "Agency" => meeting.agency = text,
                        "Name" => meeting.committee = text,
                        "AgendaId" => meeting.agenda_id = text,
                        "Date" => meeting.date = parse_service_date(&text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"CommitteeMeeting" {
                    if let Some(meeting) = current.take() {
                        meetings.push(meeting);
                    }
                } else {
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "meeting payload truncated");
                break;
            }
            _ => {}
        }
    }
    meetings
}

/// Parse `CommitteeMeetingItem` blocks; items without a bill id are
/// dropped.
fn parse_agenda(xml: &str) -> Vec<AgendaItem> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut bill_id = String::new();
    let mut description = String::new();
    let mut inside = false;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "CommitteeMeetingItem" {
                    inside = true;
                    bill_id.clear();
                    description.clear();
                } else if inside {
                    field = Some(name);
                }
            }
            Ok(Event::Text(t)) => {
                if inside {
                    let text = t.unescape().unwrap_or_default().trim().to_string();
                    match field.as_deref() {
                        Some("BillId") => bill_id = text,
                        Some("ItemDescription") => description = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"CommitteeMeetingItem" {
                    inside = false;
                    if !bill_id.is_empty() {
                        items.push(AgendaItem {
                            bill_id: std::mem::take(&mut bill_id),
                            description: std::mem::take(&mut description),
                        });
                    }
                } else {
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    items
}

fn parse_service_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").ok()
}
