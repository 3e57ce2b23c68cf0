//! Command-line arguments for the `snmp-agent` binary.

use std::sync::Arc;

use clap::Parser;

use crate::handler::{Counter32Object, ManagedObject, StaticValue, Uptime};
use crate::oid::Oid;
use crate::value::{Value, ValueType};

/// Serve a small set of managed objects over SNMP v1/v2c.
#[derive(Debug, Parser)]
#[command(name = "snmp-agent", version, about)]
pub struct AgentArgs {
    /// UDP address to listen on.
    #[arg(long = "bind", default_value = "0.0.0.0:5000")]
    pub bind: String,

    /// Accepted community string (repeatable). Any community is accepted if none is given.
    #[arg(short = 'c', long = "community", value_name = "STR")]
    pub communities: Vec<String>,

    /// Extra object to serve (repeatable), e.g. `1.3.6.1.4.1.99999.1.0=s:hello`.
    ///
    /// Types: s (string), i (integer), c (counter), g (gauge), t (timeticks).
    #[arg(long = "object", value_name = "OID=TYPE:VALUE")]
    pub objects: Vec<ObjectSpec>,

    /// Do not register the built-in system and demonstration objects.
    #[arg(long = "no-samples")]
    pub no_samples: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl AgentArgs {
    /// Initialize the tracing subscriber on stderr.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = match self.verbose {
            0 => "tiny_snmp_agent=warn",
            1 => "tiny_snmp_agent=debug",
            _ => "tiny_snmp_agent=trace",
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Objects to register: the samples (unless disabled), then `--object` entries.
    ///
    /// `--object` entries replace samples registered under the same OID.
    pub fn objects(&self) -> Vec<(Oid, Arc<dyn ManagedObject>)> {
        let mut objects = if self.no_samples {
            Vec::new()
        } else {
            sample_objects()
        };

        for spec in &self.objects {
            objects.push((spec.oid.clone(), spec.object()));
        }
        objects
    }
}

/// System group scalars plus two demonstration objects.
pub fn sample_objects() -> Vec<(Oid, Arc<dyn ManagedObject>)> {
    let descr = format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    let objects: [(Oid, Arc<dyn ManagedObject>); 5] = [
        (
            crate::oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            Arc::new(StaticValue::string(descr)),
        ),
        (crate::oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Arc::new(Uptime::new())),
        (
            crate::oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
            Arc::new(StaticValue::string(hostname())),
        ),
        (
            crate::oid!(1, 2, 3, 4),
            Arc::new(StaticValue::string("string value")),
        ),
        (crate::oid!(1, 2, 3, 5), Arc::new(StaticValue::integer(5))),
    ];
    objects.into()
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

/// Type specifier for `--object` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// OCTET STRING from UTF-8
    String,
    /// INTEGER (i32)
    Integer,
    /// Counter32, incremented on every read
    Counter,
    /// Gauge32
    Gauge,
    /// TimeTicks
    TimeTicks,
}

impl ObjectType {
    /// Type tag announced for objects of this kind.
    pub fn value_type(self) -> ValueType {
        match self {
            ObjectType::String => ValueType::OctetString,
            ObjectType::Integer => ValueType::Integer,
            ObjectType::Counter => ValueType::Counter32,
            ObjectType::Gauge => ValueType::Gauge32,
            ObjectType::TimeTicks => ValueType::TimeTicks,
        }
    }
}

impl std::str::FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(ObjectType::String),
            "i" => Ok(ObjectType::Integer),
            "c" => Ok(ObjectType::Counter),
            "g" => Ok(ObjectType::Gauge),
            "t" => Ok(ObjectType::TimeTicks),
            _ => Err(format!("invalid type specifier: {}", s)),
        }
    }
}

/// One `--object OID=TYPE:VALUE` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSpec {
    pub oid: Oid,
    pub object_type: ObjectType,
    pub value: Value,
}

impl ObjectSpec {
    /// Build the managed object this argument describes.
    pub fn object(&self) -> Arc<dyn ManagedObject> {
        match (&self.object_type, &self.value) {
            (ObjectType::Counter, Value::Counter32(start)) => Arc::new(Counter32Object::new(*start)),
            (ty, value) => Arc::new(StaticValue::with_type(ty.value_type(), value.clone())),
        }
    }
}

impl std::str::FromStr for ObjectSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (oid, rest) = s
            .split_once('=')
            .ok_or_else(|| format!("expected OID=TYPE:VALUE, got: {}", s))?;
        let (ty, value) = rest
            .split_once(':')
            .ok_or_else(|| format!("expected TYPE:VALUE after '=', got: {}", rest))?;

        let oid = Oid::parse(oid).map_err(|e| format!("invalid OID {}: {}", oid, e))?;
        oid.validate()
            .map_err(|e| format!("invalid OID {}: {}", oid, e))?;
        let object_type: ObjectType = ty.parse()?;

        let value = match object_type {
            ObjectType::String => Value::from(value),
            ObjectType::Integer => Value::Integer(
                value
                    .parse()
                    .map_err(|_| format!("invalid integer value: {}", value))?,
            ),
            ObjectType::Counter => Value::Counter32(
                value
                    .parse()
                    .map_err(|_| format!("invalid counter value: {}", value))?,
            ),
            ObjectType::Gauge => Value::Gauge32(
                value
                    .parse()
                    .map_err(|_| format!("invalid gauge value: {}", value))?,
            ),
            ObjectType::TimeTicks => Value::TimeTicks(
                value
                    .parse()
                    .map_err(|_| format!("invalid timeticks value: {}", value))?,
            ),
        };

        Ok(ObjectSpec {
            oid,
            object_type,
            value,
        })
    }
}
