use itertools::Itertools;
use kh_cube::*;

type Group = (isize, isize, usize, Vec<i64>);

fn homology(d: Diagram, htype: HomologyType) -> KhHomology { 
    let config = KhConfig::default().with_type(htype);
    let mut store = DiagramStore::new(config).unwrap();
    let slot = store.initialize_diagram(d, "test", None).unwrap();
    store.homology(slot).unwrap()
}

fn pd(code: &[[usize; 4]]) -> Diagram {
    Diagram::from_pd_code(code.iter().cloned()).unwrap()
}

fn groups(h: &KhHomology) -> Vec<Group> {
    h.nonzero().map(|(idx, s)| {
        let tors: Vec<i64> = s.tors().iter().map(|p| p.to_string().parse().unwrap()).collect();
        (idx.0, idx.1, s.rank(), tors)
    }).collect()
}

fn assert_groups(h: &KhHomology, expected: &[(isize, isize, usize, &[i64])]) { 
    let expected = expected.iter().map(|&(i, j, r, t)| (i, j, r, t.to_vec())).sorted().collect_vec();
    assert_eq!(groups(h), expected);
}

fn left_trefoil() -> Diagram {
    pd(&[[1, 4, 2, 5], [3, 6, 4, 1], [5, 2, 6, 3]])
}

fn right_trefoil() -> Diagram { 
    pd(&[[1, 5, 2, 4], [3, 1, 4, 6], [5, 3, 6, 2]])
}

#[test]
fn trefoil_standard() { 
    let h = homology(left_trefoil(), HomologyType::Standard);
    assert_groups(&h, &[
        (-3, -9, 1, &[]),
        (-2, -7, 0, &[2]),
        (-2, -5, 1, &[]),
        ( 0, -3, 1, &[]),
        ( 0, -1, 1, &[]),
    ]);
}

#[test]
fn trefoil_reduced() { 
    for t in [HomologyType::Reduced, HomologyType::ReducedOdd] { 
        let h = homology(left_trefoil(), t);
        assert_groups(&h, &[
            (-3, -8, 1, &[]),
            (-2, -6, 1, &[]),
            ( 0, -2, 1, &[]),
        ]);
    }
}

#[test]
fn trefoil_odd() { 
    let h = homology(left_trefoil(), HomologyType::Odd);
    assert_groups(&h, &[
        (-3, -9, 1, &[]),
        (-3, -7, 1, &[]),
        (-2, -7, 1, &[]),
        (-2, -5, 1, &[]),
        ( 0, -3, 1, &[]),
        ( 0, -1, 1, &[]),
    ]);
}

#[test]
fn trefoil_unified() { 
    let h = homology(left_trefoil(), HomologyType::Unified);
    assert_groups(&h, &[
        (-3, -9, 2, &[]),
        (-3, -7, 1, &[]),
        (-2, -7, 1, &[]),
        (-2, -5, 2, &[]),
        ( 0, -3, 2, &[]),
        ( 0, -1, 2, &[]),
    ]);
}

#[test]
fn right_trefoil_standard() { 
    let h = homology(right_trefoil(), HomologyType::Standard);
    assert_groups(&h, &[
        (0, 1, 1, &[]),
        (0, 3, 1, &[]),
        (2, 5, 1, &[]),
        (3, 7, 0, &[2]),
        (3, 9, 1, &[]),
    ]);
    assert_eq!(h.total_rank(), 4);
}

#[test]
fn right_trefoil_reduced() { 
    let h = homology(right_trefoil(), HomologyType::Reduced);
    assert_groups(&h, &[
        (0, 2, 1, &[]),
        (2, 6, 1, &[]),
        (3, 8, 1, &[]),
    ]);
}

#[test]
fn figure_eight() {
    let h = homology(Diagram::load("4_1").unwrap(), HomologyType::Standard);
    assert_groups(&h, &[
        (-2, -5, 1, &[]),
        (-1, -3, 0, &[2]),
        (-1, -1, 1, &[]),
        ( 0, -1, 1, &[]),
        ( 0,  1, 1, &[]),
        ( 1,  1, 1, &[]),
        ( 2,  3, 0, &[2]),
        ( 2,  5, 1, &[]),
    ]);
}

#[test]
fn k5_2_reduced() {
    for t in [HomologyType::Reduced, HomologyType::ReducedOdd] {
        let h = homology(Diagram::load("5_2").unwrap(), t);
        assert_groups(&h, &[
            (-5, -12, 1, &[]),
            (-4, -10, 1, &[]),
            (-3,  -8, 1, &[]),
            (-2,  -6, 2, &[]),
            (-1,  -4, 1, &[]),
            ( 0,  -2, 1, &[]),
        ]);
    }
}

#[test]
fn k6_1_reduced() {
    for t in [HomologyType::Reduced, HomologyType::ReducedOdd] { 
        let h = homology(Diagram::load("6_1").unwrap(), t);
        assert_groups(&h, &[
            (-4, -8, 1, &[]),
            (-3, -6, 1, &[]),
            (-2, -4, 1, &[]),
            (-1, -2, 2, &[]),
            ( 0,  0, 2, &[]),
            ( 1,  2, 1, &[]),
            ( 2,  4, 1, &[]),
        ]);
    }
}

#[test]
fn k8_19_even_reduced() { 
    let h = homology(Diagram::load("8_19").unwrap(), HomologyType::Reduced);
    assert_groups(&h, &[
        (0,  6, 1, &[]),
        (2, 10, 1, &[]),
        (3, 12, 1, &[]),
        (4, 12, 1, &[]),
        (5, 16, 1, &[]),
    ]);
}

#[test]
fn k8_19_odd_reduced() { 
    let h = homology(Diagram::load("8_19").unwrap(), HomologyType::ReducedOdd);
    assert_groups(&h, &[
        (0,  6, 1, &[]),
        (2, 10, 1, &[]),
        (4, 12, 0, &[2]),
        (5, 14, 0, &[3]),
        (5, 16, 1, &[]),
    ]);
    assert_eq!(h.torsion_orders(), vec![Int::from(2), Int::from(3)]);
}

#[test]
fn hopf_link() { 
    let d = pd(&[[4, 1, 3, 2], [2, 3, 1, 4]]);
    assert_eq!(d.writhe(), -2);

    let h = homology(d.clone(), HomologyType::Standard);
    assert_groups(&h, &[
        (-2, -6, 1, &[]),
        (-2, -4, 1, &[]),
        ( 0, -2, 1, &[]),
        ( 0,  0, 1, &[]),
    ]);

    let h = homology(d, HomologyType::Reduced);
    assert_groups(&h, &[
        (-2, -5, 1, &[]),
        ( 0, -1, 1, &[]),
    ]);
}

#[test]
fn kinks() { 
    for code in [[1, 1, 2, 2], [1, 2, 2, 1]] { 
        let d = pd(&[code]);
        assert_eq!(d.ncrossings(), 1);

        let h = homology(d.clone(), HomologyType::Standard);
        assert_groups(&h, &[(0, -1, 1, &[]), (0, 1, 1, &[])]);

        let h = homology(d, HomologyType::Reduced);
        assert_groups(&h, &[(0, 0, 1, &[])]);
    }
}

#[test]
fn unknot() { 
    let h = homology(Diagram::unknot(), HomologyType::Standard);
    assert_groups(&h, &[(0, -1, 1, &[]), (0, 1, 1, &[])]);
    assert!(h.is_free());
    assert_eq!(rational_poly(&h), Poly::from_tq([(0, -1, 1), (0, 1, 1)]));
    assert_eq!(torsion_poly(&h), Poly::default());
}

#[test]
fn unlinks() {
    let expected: &[(isize, isize, usize, &[i64])] = &[(0, -2, 1, &[]), (0, 0, 2, &[]), (0, 2, 1, &[])];

    let h = homology(Diagram::unlink(2), HomologyType::Standard);
    assert_groups(&h, expected);

    let h = homology(pd(&[[1, 2, 3, 4], [3, 2, 1, 4]]), HomologyType::Standard);
    assert_groups(&h, expected);
}

#[test]
fn trefoil_with_free_loop() { 
    let h = homology(left_trefoil().with_free_loops(1), HomologyType::Standard);
    assert_groups(&h, &[
        (-3, -10, 1, &[]),
        (-3,  -8, 1, &[]),
        (-2,  -8, 0, &[2]),
        (-2,  -6, 1, &[2]),
        (-2,  -4, 1, &[]),
        ( 0,  -4, 1, &[]),
        ( 0,  -2, 2, &[]),
        ( 0,   0, 1, &[]),
    ]);
}

#[test]
fn empty_diagram() { 
    let h = homology(Diagram::empty(), HomologyType::Standard);
    assert_groups(&h, &[(0, 0, 1, &[])]);

    let config = KhConfig::default().with_type(HomologyType::Reduced);
    let mut store = DiagramStore::new(config).unwrap();
    let slot = store.initialize_diagram(Diagram::empty(), "empty", None).unwrap();
    assert!(matches!(store.homology(slot), Err(KhError::InvalidDiagram(_))));
}
