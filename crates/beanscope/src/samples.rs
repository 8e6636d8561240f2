//! Bundled in-process managed objects.
//!
//! These back the default "local" target so every engine path — scalar
//! attributes, record tables, raising operations, ignore-listed
//! accessors — can be exercised without a remote process. Each component
//! uses interior mutability because handles are shared and only borrowed
//! per request.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use beanscope_core::{
    InvocationFault, LocalRegistry, ManagedObject, RecordSchema, RecordValue, TypeDescriptor,
    TypeRef, Value,
};

/// Registry with the bundled samples, as served by the local target.
pub fn registry() -> LocalRegistry {
    let mut registry = LocalRegistry::new();
    registry.insert("sample.CounterService", Arc::new(CounterService::new()));
    registry.insert("jobs.TaskQueue", Arc::new(TaskQueue::new()));
    registry.insert("pool.DataSource", Arc::new(DataSource::new()));
    registry
}

// ── CounterService ───────────────────────────────────────────────────

/// Scalar read-write attributes plus a value-returning operation.
struct CounterService {
    count: AtomicI32,
    enabled: AtomicBool,
    descriptor: Arc<TypeDescriptor>,
}

impl CounterService {
    fn new() -> Self {
        let descriptor = TypeDescriptor::builder::<CounterService>("sample.CounterService")
            .getter("getCount", TypeRef::Int, |c| {
                Value::Int(c.count.load(Ordering::SeqCst))
            })
            .setter("setCount", TypeRef::Int, |c, value| match value {
                Value::Int(v) => {
                    c.count.store(*v, Ordering::SeqCst);
                    Ok(())
                }
                other => Err(InvocationFault::message(format!(
                    "expected int, got {}",
                    other.type_name()
                ))),
            })
            .getter("isEnabled", TypeRef::Bool, |c| {
                Value::Bool(c.enabled.load(Ordering::SeqCst))
            })
            .setter("setEnabled", TypeRef::Bool, |c, value| match value {
                Value::Bool(v) => {
                    c.enabled.store(*v, Ordering::SeqCst);
                    Ok(())
                }
                other => Err(InvocationFault::message(format!(
                    "expected boolean, got {}",
                    other.type_name()
                ))),
            })
            .method(
                "reset",
                Vec::new(),
                Some(TypeRef::Int),
                |c: &CounterService, _| Ok(Value::Int(c.count.swap(0, Ordering::SeqCst))),
            )
            .build();
        Self {
            count: AtomicI32::new(0),
            enabled: AtomicBool::new(true),
            descriptor,
        }
    }
}

impl ManagedObject for CounterService {
    fn descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ── TaskQueue ────────────────────────────────────────────────────────

#[derive(Clone)]
struct Job {
    name: String,
    priority: i32,
}

/// Record-valued attribute (renders as a table) plus operations that
/// take coerced arguments and can raise.
struct TaskQueue {
    jobs: Mutex<Vec<Job>>,
    schema: Arc<RecordSchema>,
    descriptor: Arc<TypeDescriptor>,
}

impl TaskQueue {
    fn new() -> Self {
        let schema = RecordSchema::new(
            "jobs.Job",
            vec![
                ("name".into(), TypeRef::Text),
                ("priority".into(), TypeRef::Int),
            ],
        );
        let jobs_type = TypeRef::List(Box::new(TypeRef::Named("jobs.Job".into())));

        let descriptor = TypeDescriptor::builder::<TaskQueue>("jobs.TaskQueue")
            .method(
                "getJobs",
                Vec::new(),
                Some(jobs_type),
                |q: &TaskQueue, _| q.snapshot(),
            )
            .getter("getDepth", TypeRef::Int, |q| {
                let depth = q.lock().len();
                Value::Int(i32::try_from(depth).unwrap_or(i32::MAX))
            })
            .method(
                "submit",
                vec![TypeRef::Text, TypeRef::Int],
                None,
                |q: &TaskQueue, args| {
                    let (Some(Value::Text(name)), Some(Value::Int(priority))) =
                        (args.first(), args.get(1))
                    else {
                        return Err(InvocationFault::message("expected (string, int)"));
                    };
                    q.lock().push(Job {
                        name: name.clone(),
                        priority: *priority,
                    });
                    Ok(Value::Null)
                },
            )
            .method(
                "cancel",
                vec![TypeRef::Text],
                None,
                |q: &TaskQueue, args| {
                    let Some(Value::Text(name)) = args.first() else {
                        return Err(InvocationFault::message("expected (string)"));
                    };
                    let mut jobs = q.lock();
                    let before = jobs.len();
                    jobs.retain(|job| job.name != *name);
                    if jobs.len() == before {
                        return Err(InvocationFault::message(format!("no job named '{name}'")));
                    }
                    Ok(Value::Null)
                },
            )
            .method(
                "drain",
                Vec::new(),
                Some(TypeRef::Int),
                |q: &TaskQueue, _| {
                    let mut jobs = q.lock();
                    let drained = jobs.len();
                    jobs.clear();
                    Ok(Value::Int(i32::try_from(drained).unwrap_or(i32::MAX)))
                },
            )
            .build();

        let seeded = vec![
            Job {
                name: "reindex".into(),
                priority: 1,
            },
            Job {
                name: "purge-expired".into(),
                priority: 5,
            },
        ];

        Self {
            jobs: Mutex::new(seeded),
            schema,
            descriptor,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Result<Value, InvocationFault> {
        let jobs = self.lock();
        let records = jobs
            .iter()
            .map(|job| {
                RecordValue::new(
                    Arc::clone(&self.schema),
                    vec![Value::Text(job.name.clone()), Value::Int(job.priority)],
                )
                .map(Value::Record)
                .map_err(InvocationFault::raised)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(records))
    }
}

impl ManagedObject for TaskQueue {
    fn descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ── DataSource ───────────────────────────────────────────────────────

/// Pool component whose `getConnection()` sits on the default ignore
/// list — reading it would acquire a live connection.
struct DataSource {
    max_size: AtomicI32,
    descriptor: Arc<TypeDescriptor>,
}

impl DataSource {
    fn new() -> Self {
        let descriptor = TypeDescriptor::builder::<DataSource>("pool.DataSource")
            .method(
                "getConnection",
                Vec::new(),
                Some(TypeRef::Named("pool.Connection".into())),
                |_, _| {
                    Err(InvocationFault::message(
                        "connection acquisition through introspection",
                    ))
                },
            )
            .getter("getSize", TypeRef::Int, |_| Value::Int(4))
            .getter("getMaxSize", TypeRef::Int, |d| {
                Value::Int(d.max_size.load(Ordering::SeqCst))
            })
            .setter("setMaxSize", TypeRef::Int, |d, value| match value {
                Value::Int(v) => {
                    d.max_size.store(*v, Ordering::SeqCst);
                    Ok(())
                }
                other => Err(InvocationFault::message(format!(
                    "expected int, got {}",
                    other.type_name()
                ))),
            })
            .build();
        Self {
            max_size: AtomicI32::new(16),
            descriptor,
        }
    }
}

impl ManagedObject for DataSource {
    fn descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
