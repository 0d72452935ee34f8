//! Parallel orchestration: boundary scan, then a barrier between
//! projecting each unique grid once and decoding every message's data
//! against its cached coordinates.

use std::{
    collections::{HashMap, HashSet},
    io::{Read, Seek, SeekFrom},
    sync::{Arc, Mutex, Weak},
};

use rayon::prelude::*;

use crate::{
    error::{GribError, FILE_LEVEL},
    field::{Field, ReferenceTime},
    grid::GridKey,
    message::Message,
    options::{FieldInfo, ParseOptions},
    scan::{self, MessageBoundary},
};

type Coordinates = Arc<(Vec<f32>, Vec<f32>)>;

fn io_err(e: std::io::Error) -> GribError {
    GribError::invalid_format(FILE_LEVEL, 0, format!("I/O error while reading a message: {e}"))
}

/// Parses every GRIB2 message in `source` with default options: parallel
/// across a `2 x available_parallelism` worker pool, no filtering, errors
/// propagate immediately.
pub fn parse<R: Read + Seek + Send>(source: R) -> Result<Vec<Field>, GribError> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parses every GRIB2 message in `source`, honoring `options`.
pub fn parse_with_options<R: Read + Seek + Send>(
    mut source: R,
    options: &ParseOptions,
) -> Result<Vec<Field>, GribError> {
    let boundaries = scan::scan_boundaries(&mut source)?;
    if boundaries.is_empty() {
        return Ok(Vec::new());
    }

    let source = Mutex::new(source);

    if boundaries.len() == 1 || options.sequential {
        return decode_sequential(&source, &boundaries, options);
    }

    let worker_count = options.worker_count.unwrap_or_else(|| {
        2 * std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    });
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .build()
        .map_err(|e| GribError::invalid_format(FILE_LEVEL, 0, format!("failed to build worker pool: {e}")))?;

    pool.install(|| decode_parallel(&source, &boundaries, options))
}

fn read_message_bytes<R: Read + Seek>(
    source: &Mutex<R>,
    boundary: &MessageBoundary,
) -> Result<Vec<u8>, GribError> {
    let mut guard = source.lock().expect("source mutex poisoned");
    guard.seek(SeekFrom::Start(boundary.offset)).map_err(io_err)?;
    let mut buf = vec![0u8; boundary.length as usize];
    guard.read_exact(&mut buf).map_err(io_err)?;
    Ok(buf)
}

fn field_info(index: usize, message: &Message) -> FieldInfo {
    let (category, number) = message.product.product.parameter();
    FieldInfo {
        message_index: index,
        discipline: message.indicator.discipline,
        centre_id: message.identification.centre_id,
        parameter_category: category,
        parameter_number: number,
    }
}

fn build_field(
    index: usize,
    message: &Message,
    handle: Weak<Message>,
    coords: &Coordinates,
    values: Vec<f32>,
) -> Field {
    let (ni, nj) = message.grid.grid.ni_nj();
    let (parameter_category, parameter_number) = message.product.product.parameter();
    let first_surface = message.product.product.first_surface();
    let id = &message.identification;
    Field {
        message_index: index,
        discipline: message.indicator.discipline,
        centre_id: id.centre_id,
        parameter_category,
        parameter_number,
        grid_short_name: message.grid.grid.short_name(),
        ni,
        nj,
        lats: coords.0.clone(),
        lons: coords.1.clone(),
        values,
        level_type: first_surface.surface_type,
        level_scale_factor: first_surface.scale_factor,
        level_scaled_value: first_surface.scaled_value,
        reference_time: ReferenceTime {
            year: id.year,
            month: id.month,
            day: id.day,
            hour: id.hour,
            minute: id.minute,
            second: id.second,
        },
        message: handle,
    }
}

fn decode_sequential<R: Read + Seek>(
    source: &Mutex<R>,
    boundaries: &[MessageBoundary],
    options: &ParseOptions,
) -> Result<Vec<Field>, GribError> {
    let mut cache: HashMap<GridKey, Coordinates> = HashMap::new();
    let mut fields = Vec::new();

    for (index, boundary) in boundaries.iter().enumerate() {
        if options.is_cancelled() {
            return Err(GribError::Cancelled);
        }
        let outcome = (|| -> Result<Option<Field>, GribError> {
            let bytes = read_message_bytes(source, boundary)?;
            let message = Arc::new(Message::parse(&bytes)?);
            if !options.accepts(&field_info(index, &message)) {
                return Ok(None);
            }
            let key = message
                .grid
                .grid
                .grid_key(message.grid.template_number, message.grid.num_data_points);
            let coords = match cache.get(&key) {
                Some(c) => Arc::clone(c),
                None => {
                    let coords = Arc::new(message.grid.grid.coordinates()?);
                    cache.insert(key, Arc::clone(&coords));
                    coords
                }
            };
            let total_points = message.grid.num_data_points as usize;
            let values =
                message
                    .representation
                    .representation
                    .decode(&message.data.payload, &message.bitmap, total_points, 0)?;
            Ok(Some(build_field(index, &message, Arc::downgrade(&message), &coords, values)))
        })();

        match outcome {
            Ok(Some(field)) => fields.push(field),
            Ok(None) => {}
            Err(e) if options.skip_errors => {
                log::warn!("skipping message {index}: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(fields)
}

fn decode_parallel<R: Read + Seek + Send>(
    source: &Mutex<R>,
    boundaries: &[MessageBoundary],
    options: &ParseOptions,
) -> Result<Vec<Field>, GribError> {
    // Phase 1: parse every message's sections structurally.
    let parsed: Vec<Option<(usize, Arc<Message>)>> = boundaries
        .par_iter()
        .enumerate()
        .map(|(index, boundary)| -> Result<Option<(usize, Arc<Message>)>, GribError> {
            if options.is_cancelled() {
                return Err(GribError::Cancelled);
            }
            let bytes = read_message_bytes(source, boundary)?;
            match Message::parse(&bytes) {
                Ok(message) => Ok(Some((index, Arc::new(message)))),
                Err(e) if options.skip_errors => {
                    log::warn!("skipping message {index}: {e}");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .collect::<Result<Vec<_>, GribError>>()?;

    let parsed: Vec<(usize, Arc<Message>)> = parsed
        .into_iter()
        .flatten()
        .filter(|(index, message)| options.accepts(&field_info(*index, message)))
        .collect();

    // Barrier: every unique grid is projected exactly once before any
    // message is decoded against it.
    let mut seen = HashSet::new();
    let unique_grids: Vec<_> = parsed
        .iter()
        .filter_map(|(_, message)| {
            let key = message
                .grid
                .grid
                .grid_key(message.grid.template_number, message.grid.num_data_points);
            seen.insert(key).then(|| (key, message.grid.grid.clone()))
        })
        .collect();

    let cache: Mutex<HashMap<GridKey, Coordinates>> = Mutex::new(HashMap::new());
    unique_grids
        .par_iter()
        .try_for_each(|(key, grid)| -> Result<(), GribError> {
            if options.is_cancelled() {
                return Err(GribError::Cancelled);
            }
            let coords = Arc::new(grid.coordinates()?);
            cache.lock().expect("cache mutex poisoned").insert(*key, coords);
            Ok(())
        })?;

    // Phase 2: decode each message's data against its cached projection.
    let mut results: Vec<Option<Field>> = (0..boundaries.len()).map(|_| None).collect();
    let decoded: Vec<Result<(usize, Field), GribError>> = parsed
        .par_iter()
        .map(|(index, message)| -> Result<(usize, Field), GribError> {
            if options.is_cancelled() {
                return Err(GribError::Cancelled);
            }
            let key = message
                .grid
                .grid
                .grid_key(message.grid.template_number, message.grid.num_data_points);
            let coords = cache
                .lock()
                .expect("cache mutex poisoned")
                .get(&key)
                .cloned()
                .expect("every grid key was projected during the barrier phase");
            let total_points = message.grid.num_data_points as usize;
            let values = message.representation.representation.decode(
                &message.data.payload,
                &message.bitmap,
                total_points,
                0,
            )?;
            Ok((*index, build_field(*index, message, Arc::downgrade(message), &coords, values)))
        })
        .collect();

    for outcome in decoded {
        match outcome {
            Ok((index, field)) => results[index] = Some(field),
            Err(e) if options.skip_errors => log::warn!("skipping a message during decode: {e}"),
            Err(e) => return Err(e),
        }
    }

    Ok(results.into_iter().flatten().collect())
}
