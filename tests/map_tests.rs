// tests/map_tests.rs

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use flate2::read::ZlibEncoder;
use flate2::Compression;
use std::io::Read;

use tmx_map::{
    Colour, Error, LayerKind, Map, Orientation, PropertyValue, RenderOrder, TileData,
    FLIP_HORIZONTAL, FLIP_VERTICAL,
};

const SMALL_MAP: &str = r##"
<map version="1.10" orientation="orthogonal" renderorder="right-down"
     width="2" height="2" tilewidth="16" tileheight="16" backgroundcolor="#101820">
  <properties>
    <property name="music" value="overworld.ogg"/>
  </properties>
  <tileset firstgid="1" name="terrain" tilewidth="16" tileheight="16" tilecount="4" columns="2">
    <image source="terrain.png" width="32" height="32"/>
  </tileset>
  <layer name="ground" width="2" height="2">
    <data encoding="csv">1,2,0,4</data>
  </layer>
</map>"##;

#[test]
fn small_map_parses_end_to_end() {
    let map = Map::load_from_str(SMALL_MAP, "assets").expect("should parse inline map");

    assert_eq!(map.version.major, 1);
    assert_eq!(map.version.minor, 10);
    assert_eq!(map.orientation, Orientation::Orthogonal);
    assert_eq!(map.render_order, RenderOrder::RightDown);
    assert_eq!(map.background_colour, Some(Colour::new(0x10, 0x18, 0x20, 255)));
    assert_eq!(map.properties.len(), 1);
    assert_eq!(
        map.properties[0].value,
        PropertyValue::String("overworld.ogg".to_owned())
    );
    assert_eq!(map.bounds().width, 32.0);
    assert_eq!(map.bounds().height, 32.0);

    assert_eq!(map.tilesets.len(), 1);
    assert_eq!(map.tilesets[0].image_path, "assets/terrain.png");
    assert_eq!(map.tilesets[0].tiles().len(), 4);

    assert_eq!(map.layers.len(), 1);
    let tiles = match map.layers[0].as_tiles().expect("ground is a tile layer") {
        TileData::Finite(tiles) => tiles,
        TileData::Chunks(_) => panic!("finite map should not produce chunks"),
    };
    assert_eq!(tiles.len(), 4);
    assert_eq!(tiles[0].gid, 1);
    assert_eq!(tiles[1].gid, 2);
    assert!(tiles[2].is_empty());
    assert_eq!(tiles[3].gid, 4);

    // The second cell belongs to the only tileset, one tile in.
    let (tileset, local) = map.tileset_for(tiles[1].gid).unwrap();
    assert_eq!(tileset.name, "terrain");
    assert_eq!(local, 1);
}

const THREE_TILESETS: &str = r#"
<map version="1.4" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8">
  <tileset firstgid="1" name="low" tilewidth="8" tileheight="8" tilecount="49" columns="7"/>
  <tileset firstgid="50" name="mid" tilewidth="8" tileheight="8" tilecount="70" columns="10"/>
  <tileset firstgid="120" name="high" tilewidth="8" tileheight="8" tilecount="30" columns="6"/>
</map>"#;

#[test]
fn gids_resolve_to_the_tileset_covering_them() {
    let map = Map::load_from_str(THREE_TILESETS, "").unwrap();

    let (tileset, local) = map.tileset_for(75).unwrap();
    assert_eq!(tileset.name, "mid");
    assert_eq!(local, 25);

    let (tileset, local) = map.tileset_for(120).unwrap();
    assert_eq!(tileset.name, "high");
    assert_eq!(local, 0);

    let (tileset, _) = map.tileset_for(49).unwrap();
    assert_eq!(tileset.name, "low");

    assert!(map.tileset_for(0).is_none());
    assert!(map.tileset_for(150).is_none());
    assert!(map.tileset_for(200).is_none());
}

#[test]
fn flip_bits_survive_the_trip_through_a_layer() {
    let raw = 1u32 | (1 << 31) | (1 << 30);
    let xml = format!(
        r#"<map version="1.0" orientation="orthogonal" width="1" height="1"
                tilewidth="8" tileheight="8">
             <layer name="l" width="1" height="1">
               <data encoding="csv">{}</data>
             </layer>
           </map>"#,
        raw
    );
    let map = Map::load_from_str(&xml, "").unwrap();
    let tiles = match map.layers[0].as_tiles().unwrap() {
        TileData::Finite(tiles) => tiles,
        TileData::Chunks(_) => panic!("expected a finite layer"),
    };
    assert_eq!(tiles[0].gid, 1);
    assert_eq!(tiles[0].flags, FLIP_HORIZONTAL | FLIP_VERTICAL);
    assert!(tiles[0].flip_horizontal());
    assert!(tiles[0].flip_vertical());
    assert!(!tiles[0].flip_diagonal());
}

#[test]
fn base64_zlib_layers_decode_like_csv_ones() {
    let cells: [u32; 4] = [1, 2, 0, 4];
    let mut bytes = Vec::new();
    for cell in cells {
        bytes.extend_from_slice(&cell.to_le_bytes());
    }
    let mut compressed = Vec::new();
    ZlibEncoder::new(&bytes[..], Compression::default())
        .read_to_end(&mut compressed)
        .unwrap();
    let xml = format!(
        r#"<map version="1.0" orientation="orthogonal" width="2" height="2"
                tilewidth="8" tileheight="8">
             <layer name="l" width="2" height="2">
               <data encoding="base64" compression="zlib">{}</data>
             </layer>
           </map>"#,
        BASE64_STANDARD.encode(&compressed)
    );
    let map = Map::load_from_str(&xml, "").unwrap();
    let tiles = match map.layers[0].as_tiles().unwrap() {
        TileData::Finite(tiles) => tiles,
        TileData::Chunks(_) => panic!("expected a finite layer"),
    };
    assert_eq!(tiles.iter().map(|t| t.gid).collect::<Vec<_>>(), vec![1, 2, 0, 4]);
}

const CHUNKED_MAP: &str = r#"
<map version="1.10" orientation="orthogonal" width="4" height="4"
     tilewidth="8" tileheight="8" infinite="1">
  <layer name="world" width="4" height="4">
    <data encoding="csv">
      <chunk x="0" y="0" width="2" height="2">1,2,3,4</chunk>
      <chunk x="-2" y="2" width="2" height="2">5,6,7,8</chunk>
    </data>
  </layer>
</map>"#;

#[test]
fn infinite_maps_come_back_as_chunks() {
    let map = Map::load_from_str(CHUNKED_MAP, "").unwrap();
    assert!(map.infinite);

    let chunks = match map.layers[0].as_tiles().unwrap() {
        TileData::Chunks(chunks) => chunks,
        TileData::Finite(_) => panic!("infinite map should produce chunks"),
    };
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].tiles[0].gid, 1);
    assert_eq!(chunks[1].position.x, -2);
    assert_eq!(chunks[1].position.y, 2);
    assert_eq!(chunks[1].tiles[3].gid, 8);
}

#[test]
fn animated_tiles_are_keyed_by_global_id() {
    let xml = r#"
<map version="1.0" orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
  <tileset firstgid="5" name="water" tilewidth="16" tileheight="16" tilecount="2" columns="2">
    <image source="water.png" width="32" height="16"/>
    <tile id="1">
      <animation>
        <frame tileid="0" duration="150"/>
        <frame tileid="1" duration="150"/>
      </animation>
    </tile>
  </tileset>
</map>"#;
    let map = Map::load_from_str(xml, "").unwrap();
    let animated = map.animated_tiles();
    assert_eq!(animated.len(), 1);
    let tile = animated.get(&6).expect("tile 1 of firstgid 5 is gid 6");
    assert_eq!(tile.animation[0].tile_id, 5);
    assert_eq!(tile.animation[1].tile_id, 6);
}

#[test]
fn group_layers_nest_and_keep_document_order() {
    let xml = r#"
<map version="1.0" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8">
  <group name="background">
    <imagelayer name="sky">
      <image source="sky.png" width="64" height="64"/>
    </imagelayer>
    <layer name="hills" width="1" height="1">
      <data encoding="csv">0</data>
    </layer>
  </group>
  <objectgroup name="actors">
    <object id="1" name="player" x="4" y="4"/>
  </objectgroup>
</map>"#;
    let map = Map::load_from_str(xml, "world/maps").unwrap();
    assert_eq!(map.layers.len(), 2);

    let group = map.layers[0].as_group().expect("first layer is a group");
    assert_eq!(group.layers.len(), 2);
    let sky = group.layers[0].as_image().unwrap();
    assert_eq!(sky.image_path, "world/maps/sky.png");
    assert!(group.layers[1].as_tiles().is_some());

    let actors = map.layers[1].as_objects().unwrap();
    assert_eq!(actors.objects[0].name, "player");
}

#[test]
fn broken_tilesets_cost_only_themselves() {
    let xml = r#"
<map version="1.0" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8">
  <tileset name="no-first-gid" tilewidth="8" tileheight="8" tilecount="1" columns="1"/>
  <tileset firstgid="1" name="good" tilewidth="8" tileheight="8" tilecount="1" columns="1"/>
</map>"#;
    let map = Map::load_from_str(xml, "").unwrap();
    assert_eq!(map.tilesets.len(), 1);
    assert_eq!(map.tilesets[0].name, "good");
}

#[test]
fn structural_failures_reject_the_whole_document() {
    let no_orientation =
        r#"<map version="1.0" width="1" height="1" tilewidth="8" tileheight="8"/>"#;
    assert!(matches!(
        Map::load_from_str(no_orientation, ""),
        Err(Error::Structure(_))
    ));

    let zero_size =
        r#"<map version="1.0" orientation="orthogonal" width="0" height="1" tilewidth="8" tileheight="8"/>"#;
    assert!(matches!(
        Map::load_from_str(zero_size, ""),
        Err(Error::Structure(_))
    ));

    let bad_version =
        r#"<map version="old" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8"/>"#;
    assert!(matches!(
        Map::load_from_str(bad_version, ""),
        Err(Error::Structure(_))
    ));

    let staggered_without_axis =
        r#"<map version="1.0" orientation="staggered" width="1" height="1" tilewidth="8" tileheight="8" staggerindex="odd"/>"#;
    assert!(matches!(
        Map::load_from_str(staggered_without_axis, ""),
        Err(Error::Structure(_))
    ));

    let wrong_root = r#"<tileset name="t" tilewidth="8" tileheight="8"/>"#;
    assert!(matches!(
        Map::load_from_str(wrong_root, ""),
        Err(Error::Structure(_))
    ));
}

#[test]
fn malformed_xml_is_its_own_error() {
    let err = Map::load_from_str("<map version=\"1.0\"", "").unwrap_err();
    assert!(matches!(err, Error::Xml { .. }));
}

#[test]
fn undecodable_layers_survive_as_empty_ones() {
    let xml = r#"
<map version="1.0" orientation="orthogonal" width="2" height="2" tilewidth="8" tileheight="8">
  <layer name="short" width="2" height="2">
    <data encoding="csv">1,2,3</data>
  </layer>
  <layer name="fine" width="2" height="2">
    <data encoding="csv">1,2,3,4</data>
  </layer>
</map>"#;
    let map = Map::load_from_str(xml, "").unwrap();
    assert_eq!(map.layers.len(), 2);
    match map.layers[0].as_tiles().unwrap() {
        TileData::Finite(tiles) => assert!(tiles.is_empty()),
        TileData::Chunks(_) => panic!("expected a finite layer"),
    }
    match map.layers[1].as_tiles().unwrap() {
        TileData::Finite(tiles) => assert_eq!(tiles.len(), 4),
        TileData::Chunks(_) => panic!("expected a finite layer"),
    }
}

#[test]
fn layer_kinds_are_told_apart() {
    let xml = r#"
<map version="1.0" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8">
  <layer name="tiles" width="1" height="1"><data encoding="csv">0</data></layer>
  <objectgroup name="objects"/>
  <imagelayer name="image"><image source="bg.png"/></imagelayer>
  <group name="group"/>
</map>"#;
    let map = Map::load_from_str(xml, "").unwrap();
    assert!(matches!(map.layers[0].kind, LayerKind::Tiles(_)));
    assert!(matches!(map.layers[1].kind, LayerKind::Objects(_)));
    assert!(matches!(map.layers[2].kind, LayerKind::Image(_)));
    assert!(matches!(map.layers[3].kind, LayerKind::Group(_)));
}
