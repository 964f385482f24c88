// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Metric catalog
//!
//! Declarative tables mapping PowerDNS statistics names to exported metrics,
//! one table set per server variant:
//! - Gauges read a single statistic
//! - Counters fan out over a label map, one series per statistic
//!
//! The tables are static data; [`catalog_for`] only selects between them.

use std::fmt;
use std::str::FromStr;

use crate::histogram::RESPONSE_TIME_LABEL_MAP;

/// PowerDNS daemon flavour, as reported in `daemon_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerVariant {
    Authoritative,
    Recursor,
    Dnsdist,
}

impl ServerVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerVariant::Authoritative => "authoritative",
            ServerVariant::Recursor => "recursor",
            ServerVariant::Dnsdist => "dnsdist",
        }
    }
}

impl fmt::Display for ServerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authoritative" => Ok(ServerVariant::Authoritative),
            "recursor" => Ok(ServerVariant::Recursor),
            "dnsdist" => Ok(ServerVariant::Dnsdist),
            other => Err(format!("unknown PowerDNS daemon type: {}", other)),
        }
    }
}

/// A gauge read from one statistic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeDefinition {
    pub id: u32,
    pub name: &'static str,
    pub desc: &'static str,
    /// Statistic to read
    pub key: &'static str,
}

impl GaugeDefinition {
    /// Latency statistics are reported in microseconds
    pub fn is_latency(&self) -> bool {
        self.key.ends_with("latency")
    }

    /// Convert a raw statistic into the exported value
    pub fn scale(&self, raw: f64) -> f64 {
        if self.is_latency() {
            raw / 1_000_000.0
        } else {
            raw
        }
    }
}

/// A counter exported as one series per label map entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterDefinition {
    pub id: u32,
    pub name: &'static str,
    pub desc: &'static str,
    /// Label dimension shared by every series
    pub label: &'static str,
    /// Statistic name to label value
    pub label_map: &'static [(&'static str, &'static str)],
}

/// Gauge and counter tables for one server variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Catalog {
    pub gauges: &'static [GaugeDefinition],
    pub counters: &'static [CounterDefinition],
}

impl Catalog {
    pub const EMPTY: Catalog = Catalog {
        gauges: &[],
        counters: &[],
    };

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty() && self.counters.is_empty()
    }
}

/// Select the catalog tables for a server variant
pub fn catalog_for(variant: ServerVariant) -> Catalog {
    match variant {
        ServerVariant::Recursor => Catalog {
            gauges: RECURSOR_GAUGES,
            counters: RECURSOR_COUNTERS,
        },
        ServerVariant::Authoritative => Catalog {
            gauges: AUTHORITATIVE_GAUGES,
            counters: AUTHORITATIVE_COUNTERS,
        },
        ServerVariant::Dnsdist => Catalog {
            gauges: DNSDIST_GAUGES,
            counters: DNSDIST_COUNTERS,
        },
    }
}

const RCODE_LABEL_MAP: &[(&str, &str)] = &[
    ("servfail-answers", "servfail"),
    ("nxdomain-answers", "nxdomain"),
    ("noerror-answers", "noerror"),
];

const RECURSOR_EXCEPTIONS_LABEL_MAP: &[(&str, &str)] = &[
    ("resource-limits", "resource_limit"),
    ("over-capacity-drops", "over_capacity_drop"),
    ("unreachables", "ns_unreachable"),
    ("outgoing-timeouts", "outgoing_timeout"),
];

// PowerDNS recursor

const RECURSOR_GAUGES: &[GaugeDefinition] = &[
    GaugeDefinition {
        id: 1,
        name: "latency_average_seconds",
        desc: "Exponential moving average of question-to-answer latency.",
        key: "qa-latency",
    },
    GaugeDefinition {
        id: 2,
        name: "concurrent_queries",
        desc: "Number of concurrent queries.",
        key: "concurrent-queries",
    },
    GaugeDefinition {
        id: 3,
        name: "cache_size",
        desc: "Number of entries in the cache.",
        key: "cache-entries",
    },
];

const RECURSOR_COUNTERS: &[CounterDefinition] = &[
    CounterDefinition {
        id: 1,
        name: "incoming_queries_total",
        desc: "Total number of incoming queries by network.",
        label: "net",
        label_map: &[("questions", "udp"), ("tcp-questions", "tcp")],
    },
    CounterDefinition {
        id: 2,
        name: "outgoing_queries_total",
        desc: "Total number of outgoing queries by network.",
        label: "net",
        label_map: &[("all-outqueries", "udp"), ("tcp-outqueries", "tcp")],
    },
    CounterDefinition {
        id: 3,
        name: "cache_lookups_total",
        desc: "Total number of cache lookups by result.",
        label: "result",
        label_map: &[("cache-hits", "hit"), ("cache-misses", "miss")],
    },
    CounterDefinition {
        id: 4,
        name: "answers_rcodes_total",
        desc: "Total number of answers by response code.",
        label: "rcode",
        label_map: RCODE_LABEL_MAP,
    },
    CounterDefinition {
        id: 5,
        name: "answers_rtime_total",
        desc: "Total number of answers grouped by response time slots.",
        label: "timeslot",
        label_map: RESPONSE_TIME_LABEL_MAP,
    },
    CounterDefinition {
        id: 6,
        name: "exceptions_total",
        desc: "Total number of exceptions by error.",
        label: "error",
        label_map: RECURSOR_EXCEPTIONS_LABEL_MAP,
    },
];

// PowerDNS authoritative server

const AUTHORITATIVE_GAUGES: &[GaugeDefinition] = &[
    GaugeDefinition {
        id: 1,
        name: "latency_average_seconds",
        desc: "Average number of microseconds a packet spends within PowerDNS",
        key: "latency",
    },
    GaugeDefinition {
        id: 2,
        name: "packet_cache_size",
        desc: "Number of entries in the packet cache.",
        key: "packetcache-size",
    },
    GaugeDefinition {
        id: 3,
        name: "signature_cache_size",
        desc: "Number of entries in the signature cache.",
        key: "signature-cache-size",
    },
    GaugeDefinition {
        id: 4,
        name: "key_cache_size",
        desc: "Number of entries in the key cache.",
        key: "key-cache-size",
    },
    GaugeDefinition {
        id: 5,
        name: "metadata_cache_size",
        desc: "Number of entries in the metadata cache.",
        key: "meta-cache-size",
    },
    GaugeDefinition {
        id: 6,
        name: "security_status",
        desc: "PDNS Server Security status based on security-status.secpoll.powerdns.com",
        key: "security-status",
    },
    GaugeDefinition {
        id: 7,
        name: "qsize",
        desc: "Number of packets waiting for database attention.",
        key: "qsize-q",
    },
];

const AUTHORITATIVE_COUNTERS: &[CounterDefinition] = &[
    CounterDefinition {
        id: 1,
        name: "incoming_notifications",
        desc: "Number of NOTIFY packets that were received",
        label: "type",
        label_map: &[],
    },
    CounterDefinition {
        id: 2,
        name: "uptime",
        desc: "Uptime in seconds of the daemon",
        label: "type",
        label_map: &[("uptime", "seconds")],
    },
    CounterDefinition {
        id: 3,
        name: "dnssec",
        desc: "DNSSEC counters",
        label: "type",
        label_map: &[
            ("signatures", "signatures_created"),
            ("udp-do-queries", "ok_queries_recv"),
        ],
    },
    CounterDefinition {
        id: 4,
        name: "packet_cache_lookup",
        desc: "Packet cache lookups by result",
        label: "result",
        label_map: &[("packetcache-hit", "hit"), ("packetcache-miss", "miss")],
    },
    CounterDefinition {
        id: 5,
        name: "query_cache_lookup",
        desc: "Query cache lookups by result",
        label: "result",
        label_map: &[("query-cache-hit", "hit"), ("query-cache-miss", "miss")],
    },
    CounterDefinition {
        id: 6,
        name: "deferred_cache_actions",
        desc: "Deferred cache actions because of maintenance by type",
        label: "type",
        label_map: &[
            ("deferred-cache-inserts", "inserts"),
            ("deferred-cache-lookup", "lookups"),
        ],
    },
    CounterDefinition {
        id: 7,
        name: "dnsupdate_queries_total",
        desc: "Total number of DNS update queries by status.",
        label: "status",
        label_map: &[
            ("dnsupdate-answers", "answered"),
            ("dnsupdate-changes", "applied"),
            ("dnsupdate-queries", "requested"),
            ("dnsupdate-refused", "refused"),
        ],
    },
    CounterDefinition {
        id: 8,
        name: "recursive_queries_total",
        desc: "Total number of recursive queries by status.",
        label: "status",
        label_map: &[
            ("rd-queries", "requested"),
            ("recursing-questions", "processed"),
            ("recursing-answers", "answered"),
            ("recursion-unanswered", "unanswered"),
        ],
    },
    CounterDefinition {
        id: 9,
        name: "queries_total",
        desc: "Total number of queries by protocol.",
        label: "proto",
        label_map: &[
            ("tcp-queries", "tcp"),
            ("tcp4-queries", "tcp4"),
            ("tcp6-queries", "tcp6"),
            ("udp-queries", "udp"),
            ("udp4-queries", "udp4"),
            ("udp6-queries", "udp6"),
        ],
    },
    CounterDefinition {
        id: 10,
        name: "answers_total",
        desc: "Total number of answers by protocol.",
        label: "proto",
        label_map: &[
            ("tcp-answers", "tcp"),
            ("tcp4-answers", "tcp4"),
            ("tcp6-answers", "tcp6"),
            ("udp-answers", "udp"),
            ("udp4-answers", "udp4"),
            ("udp6-answers", "udp6"),
        ],
    },
    CounterDefinition {
        id: 11,
        name: "answers_bytes_total",
        desc: "Total number of answer bytes sent over by protocol.",
        label: "proto",
        label_map: &[
            ("tcp-answers-bytes", "tcp"),
            ("tcp4-answers-bytes", "tcp4"),
            ("tcp6-answers-bytes", "tcp6"),
            ("udp-answers-bytes", "udp"),
            ("udp4-answers-bytes", "udp4"),
            ("udp6-answers-bytes", "udp6"),
        ],
    },
    CounterDefinition {
        id: 12,
        name: "exceptions_total",
        desc: "Total number of exceptions by error.",
        label: "error",
        label_map: &[
            ("servfail-packets", "servfail"),
            ("timedout-packets", "timeout"),
            ("corrupt-packets", "corrupt_packets"),
            ("overload-drops", "backend_overload"),
            ("udp-recvbuf-errors", "recvbuf_errors"),
            ("udp-sndbuf-errors", "sndbuf_errors"),
            ("udp-in-errors", "udp_in_errors"),
            ("udp-noport-errors", "udp_noport_errors"),
        ],
    },
    CounterDefinition {
        id: 13,
        name: "cpu_utilisation",
        desc: "Number of CPU milliseconds spent in user, and kernel space",
        label: "type",
        label_map: &[("sys-msec", "sys"), ("user-msec", "user")],
    },
];

// dnsdist exposes no mapped statistics yet, only the housekeeping metrics

const DNSDIST_GAUGES: &[GaugeDefinition] = &[];
const DNSDIST_COUNTERS: &[CounterDefinition] = &[];
