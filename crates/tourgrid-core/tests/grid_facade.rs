use proptest::prelude::*;
use tourgrid_core::interaction::move_item;
use tourgrid_core::*;

#[derive(Default)]
struct RecordingHost {
    data_updates: Vec<Vec<RowRecord>>,
    cell_changes: Vec<Vec<CellChange>>,
    hidden: Vec<String>,
    deleted: Vec<String>,
    reordered: Vec<Vec<String>>,
}

impl GridHost for RecordingHost {
    fn on_data_update(&mut self, rows: &[RowRecord]) {
        self.data_updates.push(rows.to_vec());
    }

    fn on_cells_changed(&mut self, changes: &[CellChange]) {
        self.cell_changes.push(changes.to_vec());
    }

    fn on_column_hide(&mut self, key: &str) {
        self.hidden.push(key.to_string());
    }

    fn on_column_delete(&mut self, key: &str) {
        self.deleted.push(key.to_string());
    }

    fn on_columns_reordered(&mut self, keys: &[String]) {
        self.reordered.push(keys.to_vec());
    }
}

fn member(name: &str, room: &str) -> RowRecord {
    let mut row = RowRecord::new();
    row.insert("name".into(), CellValue::text(name));
    row.insert("price".into(), CellValue::text("100"));
    row.insert("qty".into(), CellValue::text("3"));
    row.insert("total".into(), CellValue::text("=price*qty"));
    row.insert("room".into(), CellValue::from_input(room));
    row
}

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::text("name", "Name").with_protection(ColumnProtection::Core),
        ColumnDescriptor::text("price", "Price").with_protection(ColumnProtection::Protected),
        ColumnDescriptor::text("qty", "Qty"),
        ColumnDescriptor::text("total", "Total").with_read_only(),
        ColumnDescriptor::bucket(
            "room",
            "Room",
            BucketColumn::new(vec![Bucket::new("101", 3), Bucket::new("102", 2)]),
        ),
    ]
}

fn rows() -> Vec<RowRecord> {
    vec![
        member("Ana", "101"),
        member("Bo", "101"),
        member("Cy", "101"),
        member("Di", ""),
    ]
}

fn grid_with(props: GridProps) -> DataGrid<RecordingHost, MemoryWidthStore> {
    DataGrid::new(props, RecordingHost::default(), MemoryWidthStore::new()).unwrap()
}

fn grid() -> DataGrid<RecordingHost, MemoryWidthStore> {
    grid_with(GridProps::new("tour-42", columns(), rows()))
}

fn names(rows: &[RowRecord]) -> Vec<String> {
    rows.iter().map(|r| r["name"].to_string()).collect()
}

#[test]
fn non_formula_cells_display_their_value() {
    let grid = grid();
    for row in grid.sheet().iter().skip(1) {
        for cell in row {
            if cell.value.is_formula() {
                assert_eq!(cell.display.text(), "300");
            } else {
                assert_eq!(cell.display, DisplayValue::Value(cell.value.clone()));
            }
        }
    }
}

#[test]
fn edit_commit_reports_full_rows_and_deltas() {
    let mut grid = grid();
    grid.select(2, 2);
    assert!(grid.handle_key(GridKey::Enter));
    grid.set_edit_buffer("5");
    assert!(grid.handle_key(GridKey::Enter));

    let host = grid.host();
    assert_eq!(host.data_updates.len(), 1);
    assert_eq!(host.data_updates[0].len(), 4);
    assert_eq!(host.data_updates[0][1]["qty"], CellValue::text("5"));
    assert_eq!(
        host.cell_changes,
        vec![vec![CellChange {
            row: 1,
            column: "qty".to_string(),
            value: CellValue::text("5"),
        }]]
    );
    assert_eq!(grid.sheet()[2][3].display.text(), "500");
}

#[test]
fn escape_cancels_edit() {
    let mut grid = grid();
    grid.select(1, 2);
    grid.begin_edit();
    grid.edit_input('9');
    assert!(grid.handle_key(GridKey::Escape));
    assert!(grid.host().data_updates.is_empty());
    assert_eq!(grid.rows()[0]["qty"], CellValue::text("3"));
}

#[test]
fn beginning_another_edit_commits_the_first() {
    let mut grid = grid();
    assert!(grid.begin_edit_at(1, 2));
    grid.set_edit_buffer("7");
    assert!(grid.begin_edit_at(2, 2));
    assert_eq!(grid.rows()[0]["qty"], CellValue::text("7"));
    assert_eq!(grid.edit_cursor().active().map(|a| a.row), Some(2));
}

#[test]
fn header_and_read_only_cells_are_not_editable() {
    let mut grid = grid();
    assert!(!grid.begin_edit_at(0, 2));
    assert!(!grid.begin_edit_at(1, 3));
    assert_eq!(grid.set_cell(0, 2, "x"), None);
    assert_eq!(grid.set_cell(1, 3, "x"), None);
    assert!(grid.host().data_updates.is_empty());
}

#[test]
fn paste_block_at_selection() {
    let mut grid = grid_with(GridProps::new(
        "t",
        vec![
            ColumnDescriptor::text("a", "A"),
            ColumnDescriptor::text("b", "B"),
            ColumnDescriptor::text("c", "C"),
        ],
        vec![RowRecord::new(), RowRecord::new()],
    ));
    grid.select(1, 1);
    let changes = grid.paste("A\tB\nC\tD");

    assert_eq!(changes.len(), 4);
    assert_eq!(grid.rows()[0]["b"], CellValue::text("A"));
    assert_eq!(grid.rows()[0]["c"], CellValue::text("B"));
    assert_eq!(grid.rows()[1]["b"], CellValue::text("C"));
    assert_eq!(grid.rows()[1]["c"], CellValue::text("D"));
    assert!(!grid.rows()[0].contains_key("a"));
    assert_eq!(grid.host().data_updates.len(), 1);
}

#[test]
fn paste_past_the_edge_is_clipped() {
    let mut grid = grid_with(GridProps::new(
        "t",
        vec![ColumnDescriptor::text("a", "A")],
        vec![RowRecord::new()],
    ));
    let changes = grid.paste("1\t2\n3\t4\n");
    assert_eq!(changes.len(), 1);
    assert_eq!(grid.rows().len(), 1);
    assert_eq!(grid.rows()[0]["a"], CellValue::text("1"));
}

#[test]
fn row_drop_moves_and_reports() {
    let mut grid = grid();
    assert!(grid.begin_row_drag(1));
    assert!(grid.sheet()[1][0].class.contains(CellClass::DRAGGING));
    assert!(grid.drop_row(3));

    assert_eq!(names(grid.rows()), vec!["Bo", "Cy", "Ana", "Di"]);
    assert_eq!(grid.host().data_updates.len(), 1);
    assert_eq!(names(&grid.host().data_updates[0]), names(grid.rows()));
    assert!(grid.drag_state().is_idle());
}

#[test]
fn row_drop_on_itself_is_a_noop() {
    let mut grid = grid();
    let before = grid.rows().to_vec();
    assert!(grid.begin_row_drag(2));
    assert!(!grid.drop_row(2));
    assert_eq!(grid.rows(), before.as_slice());
    assert!(grid.host().data_updates.is_empty());
    assert!(grid.drag_state().is_idle());
}

#[test]
fn header_row_cannot_be_dragged_or_targeted() {
    let mut grid = grid();
    assert!(!grid.begin_row_drag(0));
    assert!(grid.begin_row_drag(1));
    assert!(!grid.drop_row(0));
    assert!(grid.drag_state().is_idle());
    assert!(!grid.begin_row_drag(9));
}

#[test]
fn disabled_interactions_are_ignored() {
    let mut grid = grid_with(
        GridProps::new("t", columns(), rows())
            .with_row_drag(false)
            .with_column_resize(false),
    );
    assert!(!grid.row_drag_enabled());
    assert!(!grid.column_resize_enabled());
    assert!(!grid.begin_row_drag(1));
    assert!(!grid.begin_resize("qty", 0));
    assert!(!grid.resize_state().is_active());
    assert_eq!(grid.end_resize(10), None);
}

#[test]
fn add_ons_and_base_price_reach_formulas() {
    let mut row = RowRecord::new();
    row.insert("total".into(), CellValue::text("=base_price + add_ons_total"));
    row.insert("extras".into(), CellValue::text("=insurance * 2"));
    let props = GridProps::new(
        "t",
        vec![
            ColumnDescriptor::text("total", "Total"),
            ColumnDescriptor::text("extras", "Extras"),
        ],
        vec![row],
    )
    .with_base_price(1000.0)
    .with_add_ons(vec![AddOn::new("insurance", 30.0), AddOn::new("visa", 20.0)]);
    let grid = grid_with(props);

    let sheet = grid.sheet();
    assert_eq!(sheet[1][0].display.text(), "1050");
    assert_eq!(sheet[1][1].display.text(), "60");
}

#[test]
fn hidden_columns_from_props() {
    let grid = grid_with(GridProps::new("t", columns(), rows()).with_hidden_columns(&["qty"]));
    let keys: Vec<&str> = grid.visible_columns().iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["name", "price", "total", "room"]);
    assert_eq!(grid.sheet()[0].len(), 4);
}

#[test]
fn cancelled_edit_leaves_rows_alone() {
    let mut grid = grid();
    grid.select(1, 2);
    assert!(grid.begin_edit());
    grid.set_edit_buffer("7");
    grid.cancel_edit();
    assert!(!grid.edit_cursor().is_editing());
    assert_eq!(grid.rows()[0]["qty"], CellValue::text("3"));
    assert!(grid.host().data_updates.is_empty());
}

#[test]
fn replacing_rows_and_columns_clamps_selection() {
    let mut grid = grid();
    grid.select(4, 4);
    grid.set_rows(rows().into_iter().take(2).collect());
    assert_eq!(grid.selection(), CellPos::new(2, 4));

    grid.set_columns(columns().into_iter().take(2).collect()).unwrap();
    assert_eq!(grid.selection(), CellPos::new(2, 1));

    let duplicate = vec![
        ColumnDescriptor::text("a", "A"),
        ColumnDescriptor::text("a", "B"),
    ];
    assert!(grid.set_columns(duplicate).is_err());
    assert_eq!(grid.columns().len(), 2);
}

#[test]
fn column_drop_reorders_columns() {
    let mut grid = grid();
    assert!(grid.begin_column_drag("room"));
    assert!(grid.drop_column("price"));

    let keys: Vec<&str> = grid.columns().iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["name", "room", "price", "qty", "total"]);
    assert_eq!(
        grid.host().reordered,
        vec![vec!["name", "room", "price", "qty", "total"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()]
    );
    assert!(grid.drag_state().is_idle());
}

#[test]
fn resize_persists_and_reloads() {
    let mut grid = grid();
    assert!(grid.begin_resize("qty", 200));
    assert_eq!(grid.end_resize(240), Some(140));
    assert!(grid.begin_resize("price", 0));
    assert_eq!(grid.end_resize(-500), Some(MIN_COLUMN_WIDTH));

    let stored = grid.store().get("columnWidths_tour-42").unwrap().unwrap();
    let mut store = MemoryWidthStore::new();
    store.set("columnWidths_tour-42", &stored).unwrap();

    let reloaded = DataGrid::new(
        GridProps::new("tour-42", columns(), rows()),
        RecordingHost::default(),
        store,
    )
    .unwrap();
    assert_eq!(reloaded.column_width("qty"), 140);
    assert_eq!(reloaded.column_width("price"), 50);
    assert_eq!(reloaded.column_width("name"), DEFAULT_COLUMN_WIDTH);
}

#[test]
fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut grid = DataGrid::new(
            GridProps::new("tour/9", columns(), rows()),
            (),
            FileWidthStore::new(dir.path()),
        )
        .unwrap();
        grid.begin_resize("name", 0);
        grid.end_resize(60);
    }
    let grid = DataGrid::new(
        GridProps::new("tour/9", columns(), rows()),
        (),
        FileWidthStore::new(dir.path()),
    )
    .unwrap();
    assert_eq!(grid.column_width("name"), 160);
}

#[test]
fn corrupt_widths_fall_back_to_defaults() {
    let mut store = MemoryWidthStore::new();
    store.set("columnWidths_tour-42", "[1, 2").unwrap();
    let grid = DataGrid::new(
        GridProps::new("tour-42", columns(), rows()),
        (),
        store,
    )
    .unwrap();
    assert_eq!(grid.column_width("qty"), DEFAULT_COLUMN_WIDTH);
}

#[test]
fn hiding_keeps_rows_and_unhiding_restores_position() {
    let mut grid = grid();
    let before = grid.rows().to_vec();

    assert!(grid.hide_column("qty"));
    assert_eq!(grid.rows(), before.as_slice());
    assert_eq!(grid.host().hidden, vec!["qty"]);
    let visible: Vec<&str> = grid.visible_columns().iter().map(|c| c.key.as_str()).collect();
    assert_eq!(visible, vec!["name", "price", "total", "room"]);

    assert!(grid.show_column("qty"));
    let visible: Vec<&str> = grid.visible_columns().iter().map(|c| c.key.as_str()).collect();
    assert_eq!(visible, vec!["name", "price", "qty", "total", "room"]);
}

#[test]
fn protection_limits_header_affordances() {
    let mut grid = grid();
    assert!(!grid.hide_column("name"));
    assert!(!grid.delete_column("name"));
    assert!(!grid.delete_column("price"));
    assert!(grid.hide_column("price"));
    assert!(grid.delete_column("qty"));
    assert_eq!(grid.host().deleted, vec!["qty"]);
    assert!(grid.state().column("qty").is_none());
}

#[test]
fn full_bucket_hidden_unless_assigned() {
    let grid = grid();
    let options = |row: usize| -> Vec<String> {
        match grid.render(row, 4) {
            Some(Rendered::Choice { options, .. }) => {
                options.into_iter().map(|o| o.value).collect()
            }
            other => panic!("expected a choice, got {:?}", other),
        }
    };
    assert_eq!(options(4), vec!["", "102"]);
    assert_eq!(options(1), vec!["", "101", "102"]);
}

#[test]
fn full_bucket_rejects_new_occupant() {
    let mut grid = grid();
    assert_eq!(grid.set_cell(4, 4, "101"), None);
    assert!(grid.set_cell(4, 4, "102").is_some());
    assert!(grid.set_cell(1, 4, "").is_some());
    assert!(grid.set_cell(4, 4, "101").is_some());
}

#[test]
fn tab_follows_editable_fields() {
    let mut grid = grid_with(
        GridProps::new("t", columns(), rows()).with_editable_fields(&["qty", "name"]),
    );
    grid.select(1, 2);
    assert!(grid.handle_key(GridKey::Tab));
    assert_eq!(grid.selection(), CellPos::new(1, 0));
    assert!(grid.handle_key(GridKey::Tab));
    assert_eq!(grid.selection(), CellPos::new(2, 2));
    assert!(grid.handle_key(GridKey::BackTab));
    assert_eq!(grid.selection(), CellPos::new(1, 0));
}

#[test]
fn arrows_clamp_to_data_area() {
    let mut grid = grid();
    grid.select(1, 0);
    assert!(!grid.handle_key(GridKey::Up));
    assert!(!grid.handle_key(GridKey::Left));
    assert!(grid.handle_key(GridKey::Down));
    assert_eq!(grid.selection(), CellPos::new(2, 0));
}

#[test]
fn formula_errors_render_glyph() {
    let mut grid = grid();
    grid.set_cell(1, 0, "=price *").unwrap();
    assert_eq!(
        grid.render(1, 0),
        Some(Rendered::Error { glyph: ERROR_GLYPH })
    );
    assert!(grid.sheet()[1][0].class.contains(CellClass::ERROR));
}

proptest! {
    #[test]
    fn row_move_is_a_permutation(len in 1usize..20, from in 0usize..20, to in 0usize..20) {
        prop_assume!(from < len && to < len);
        let original: Vec<usize> = (0..len).collect();
        let mut moved = original.clone();
        move_item(&mut moved, from, to);

        prop_assert_eq!(moved.len(), original.len());
        prop_assert_eq!(moved[to], original[from]);
        let mut sorted = moved.clone();
        sorted.sort();
        prop_assert_eq!(sorted, original);
    }
}
