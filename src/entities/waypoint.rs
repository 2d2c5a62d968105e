use crate::{
    entities::Coordinates,
    error::{invalid_input_error, Error},
};

/// Parses a comma-separated visiting order. An empty string is an empty order.
pub fn parse_order(order: &str) -> Result<Vec<usize>, Error> {
    if order.trim().is_empty() {
        return Ok(vec![]);
    }

    order
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid_input_error(format!("order entry {:?}", token)))
        })
        .collect()
}

/// Reorders `waypoints` (origin first, destination excluded) by `order`.
///
/// Index 0 is the origin and is always emitted first; every entry of `order`
/// is then looked up in turn, duplicates included. The caller appends the
/// destination.
#[tracing::instrument(skip(waypoints))]
pub fn optimize(waypoints: &[Coordinates], order: &str) -> Result<Vec<Coordinates>, Error> {
    let indices = parse_order(order)?;

    std::iter::once(0)
        .chain(indices)
        .map(|index| {
            waypoints.get(index).copied().ok_or_else(|| {
                tracing::error!(index, len = waypoints.len(), "order index out of range");
                invalid_input_error(format!("order index {} out of range", index))
            })
        })
        .collect()
}

/// Parses the flat `"lng,lat,lng,lat,..."` intermediate waypoint string.
pub fn parse_waypoints(waypoints: &str) -> Result<Vec<Coordinates>, Error> {
    if waypoints.trim().is_empty() {
        return Ok(vec![]);
    }

    let numbers = waypoints
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid_input_error(format!("waypoint value {:?}", token)))
        })
        .collect::<Result<Vec<f64>, Error>>()?;

    if numbers.len() % 2 != 0 {
        return Err(invalid_input_error("waypoints must be lng,lat pairs"));
    }

    Ok(numbers
        .chunks_exact(2)
        .map(|pair| Coordinates::from_lng_lat(pair[0], pair[1]))
        .collect())
}

/// Full travel order: origin, intermediates reordered by `order`, destination.
pub fn plan_waypoints(
    waypoints: &str,
    origin: Coordinates,
    destination: Coordinates,
    order: &str,
) -> Result<Vec<Coordinates>, Error> {
    let mut candidates = vec![origin];
    candidates.extend(parse_waypoints(waypoints)?);

    let mut planned = optimize(&candidates, order)?;
    planned.push(destination);

    Ok(planned)
}

#[cfg(test)]
fn stops() -> Vec<Coordinates> {
    vec![
        Coordinates::new(35.7039, 139.7344),
        Coordinates::new(35.7010, 139.7360),
        Coordinates::new(35.7020, 139.7380),
        Coordinates::new(35.7030, 139.7400),
    ]
}

#[test]
fn empty_order_keeps_only_origin() {
    let waypoints = stops();
    assert_eq!(optimize(&waypoints, "").unwrap(), vec![waypoints[0]]);
}

#[test]
fn reorders_intermediate_stops() {
    let waypoints = stops();
    let optimized = optimize(&waypoints, "3,1,2").unwrap();

    assert_eq!(
        optimized,
        vec![waypoints[0], waypoints[3], waypoints[1], waypoints[2]]
    );
}

#[test]
fn origin_stays_first_and_length_follows_order() {
    let waypoints = stops();

    for order in ["1", "2,1", "3,2,1", "1,2,3", "2,3,1"] {
        let optimized = optimize(&waypoints, order).unwrap();
        let entries = order.split(',').count();

        assert_eq!(optimized.len(), entries + 1);
        assert_eq!(optimized[0], waypoints[0]);
    }
}

#[test]
fn duplicates_are_preserved() {
    let waypoints = stops();
    let optimized = optimize(&waypoints, "2,2").unwrap();

    assert_eq!(optimized, vec![waypoints[0], waypoints[2], waypoints[2]]);
}

#[test]
fn out_of_range_index_is_invalid_input() {
    use crate::error::INVALID_INPUT;

    let err = optimize(&stops(), "1,4").unwrap_err();
    assert_eq!(err.code, INVALID_INPUT);
}

#[test]
fn non_numeric_order_is_invalid_input() {
    use crate::error::INVALID_INPUT;

    assert_eq!(parse_order("1,x").unwrap_err().code, INVALID_INPUT);
    assert_eq!(parse_order("-1").unwrap_err().code, INVALID_INPUT);
    assert_eq!(parse_order(" 2, 1 ").unwrap(), vec![2, 1]);
}

#[test]
fn parses_lng_lat_pairs() {
    let parsed = parse_waypoints("139.7360,35.7010,139.7380,35.7020").unwrap();

    assert_eq!(
        parsed,
        vec![
            Coordinates::new(35.7010, 139.7360),
            Coordinates::new(35.7020, 139.7380),
        ]
    );
    assert!(parse_waypoints("").unwrap().is_empty());
}

#[test]
fn odd_waypoint_values_are_rejected() {
    use crate::error::INVALID_INPUT;

    let err = parse_waypoints("139.7360,35.7010,139.7380").unwrap_err();
    assert_eq!(err.code, INVALID_INPUT);
}

#[test]
fn plan_wraps_optimized_stops_with_endpoints() {
    let origin = Coordinates::new(35.7039, 139.7344);
    let destination = Coordinates::new(35.7005, 139.7424);

    let planned = plan_waypoints(
        "139.7360,35.7010,139.7380,35.7020",
        origin,
        destination,
        "2,1",
    )
    .unwrap();

    assert_eq!(
        planned,
        vec![
            origin,
            Coordinates::new(35.7020, 139.7380),
            Coordinates::new(35.7010, 139.7360),
            destination,
        ]
    );
}

#[test]
fn plan_without_intermediates_is_origin_and_destination() {
    let origin = Coordinates::new(35.7039, 139.7344);
    let destination = Coordinates::new(35.7005, 139.7424);

    let planned = plan_waypoints("", origin, destination, "").unwrap();
    assert_eq!(planned, vec![origin, destination]);
}
